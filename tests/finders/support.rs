//! Store wrappers for fault injection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use ripple_rust::{
    EvaluateOptions, Match, Predicate, RawRecord, RawStoreClient, ReadOptions, StoreError,
    StoreResult,
};

/// Delegates to `inner`, failing reads of the chosen keys with `error`.
pub struct FailingStore<S> {
    inner: S,
    failing_keys: HashSet<String>,
    error: StoreError,
    gets: AtomicUsize,
}

impl<S: RawStoreClient> FailingStore<S> {
    pub fn new(inner: S, error: StoreError) -> Self {
        Self {
            inner,
            failing_keys: HashSet::new(),
            error,
            gets: AtomicUsize::new(0),
        }
    }

    pub fn fail_on(mut self, key: &str) -> Self {
        self.failing_keys.insert(key.to_string());
        self
    }

    /// Number of `get` calls that reached this store.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl<S: RawStoreClient> RawStoreClient for FailingStore<S> {
    fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>> {
        self.inner.list_keys(bucket)
    }

    fn get(&self, bucket: &str, key: &str, options: &ReadOptions) -> StoreResult<RawRecord> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.failing_keys.contains(key) {
            return Err(self.error.clone());
        }
        self.inner.get(bucket, key, options)
    }

    fn evaluate(
        &self,
        bucket: &str,
        predicate: &Predicate,
        options: &EvaluateOptions,
    ) -> StoreResult<Vec<Match>> {
        self.inner.evaluate(bucket, predicate, options)
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
