//! RawStoreClient - what finders need from a key-value store.

use super::{EvaluateOptions, Match, RawRecord, ReadOptions, StoreError, StoreResult};
use crate::conditions::Predicate;

/// Read-side interface to a bucketed key-value store.
///
/// Connection handling, retries and timeouts belong to the implementation;
/// callers see a single result per call.
pub trait RawStoreClient: Send + Sync {
    /// Every key in the bucket, in whatever order the store enumerates them.
    fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>>;

    /// Keys delivered in chunks as the store streams them.
    ///
    /// Default implementation yields the whole `list_keys` result as one chunk.
    fn stream_keys(
        &self,
        bucket: &str,
    ) -> StoreResult<Box<dyn Iterator<Item = StoreResult<Vec<String>>> + '_>> {
        let keys = self.list_keys(bucket)?;
        Ok(Box::new(std::iter::once(Ok::<_, StoreError>(keys))))
    }

    /// Read one key. A missing key is an error for which
    /// [`StoreError::is_not_found`](super::StoreError::is_not_found) holds.
    fn get(&self, bucket: &str, key: &str, options: &ReadOptions) -> StoreResult<RawRecord>;

    /// Run a predicate over every record in the bucket and return the matches.
    fn evaluate(
        &self,
        bucket: &str,
        predicate: &Predicate,
        options: &EvaluateOptions,
    ) -> StoreResult<Vec<Match>>;
}
