//! Retriever - the read shapes finders are built from.
//!
//! Every call is a sequence of blocking store round-trips: one per key for
//! scans, one for a conditional query. Reads are not batched. A store failure
//! other than a missing key aborts the whole call, even halfway through a
//! scan.

use tracing::{debug, trace};

use crate::conditions::{compile, Conditions};
use crate::document::{instantiate, Document, Loaded, TypeRegistry};
use crate::error::FinderResult;
use crate::store::{EvaluateOptions, RawRecord, RawStoreClient, ReadOptions, StoreResult};

/// Reads documents of type `D` from their bucket.
pub struct Retriever<'a, S: ?Sized, D> {
    store: &'a S,
    options: ReadOptions,
    registry: Option<&'a TypeRegistry<D>>,
}

impl<'a, S: RawStoreClient + ?Sized, D: Document> Retriever<'a, S, D> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            options: ReadOptions::default(),
            registry: None,
        }
    }

    pub fn with_read_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: &'a TypeRegistry<D>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn bucket(&self) -> &'static str {
        D::BUCKET
    }

    pub fn read_options(&self) -> &ReadOptions {
        &self.options
    }

    /// Read one key at the configured quorum. Missing keys are `None`.
    pub fn get_one(&self, key: &str) -> StoreResult<Option<RawRecord>> {
        trace!(bucket = D::BUCKET, key, "reading key");
        match self.store.get(D::BUCKET, key, &self.options) {
            Ok(raw) => {
                trace!(bucket = D::BUCKET, key, vclock = ?raw.vclock, "key read");
                Ok(Some(raw))
            }
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Read and materialize one key.
    pub fn find_one(&self, key: &str) -> FinderResult<Option<Loaded<D>>> {
        self.get_one(key)?
            .map(|raw| instantiate(raw, self.registry))
            .transpose()
    }

    /// Every document in the bucket, in key-listing order.
    pub fn scan_all(&self) -> FinderResult<Vec<Loaded<D>>> {
        let keys = self.store.list_keys(D::BUCKET)?;
        debug!(bucket = D::BUCKET, keys = keys.len(), "scanning bucket");

        let mut documents = Vec::with_capacity(keys.len());
        for key in &keys {
            if let Some(document) = self.find_one(key)? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    /// Like [`scan_all`](Self::scan_all), but hands each document to `visit`
    /// as the key stream arrives instead of collecting them.
    pub fn scan_all_streaming<F>(&self, mut visit: F) -> FinderResult<()>
    where
        F: FnMut(Loaded<D>),
    {
        debug!(bucket = D::BUCKET, "streaming bucket");
        let mut visited = 0usize;
        for chunk in self.store.stream_keys(D::BUCKET)? {
            for key in chunk? {
                if let Some(document) = self.find_one(&key)? {
                    visit(document);
                    visited += 1;
                }
            }
        }
        debug!(bucket = D::BUCKET, visited, "stream finished");
        Ok(())
    }

    /// Documents whose attributes satisfy every condition, in evaluation order.
    pub fn query(&self, conditions: &Conditions) -> FinderResult<Vec<Loaded<D>>> {
        let predicate = compile(conditions)?;
        let matches = self
            .store
            .evaluate(D::BUCKET, &predicate, &EvaluateOptions::default())?;
        debug!(
            bucket = D::BUCKET,
            conditions = conditions.len(),
            matches = matches.len(),
            "query evaluated"
        );

        matches
            .into_iter()
            .map(|matched| instantiate(RawRecord::from_match(D::BUCKET, matched), self.registry))
            .collect()
    }

    /// The first key the store enumerates, if any. Not insertion order.
    pub fn first_key(&self) -> StoreResult<Option<String>> {
        for chunk in self.store.stream_keys(D::BUCKET)? {
            if let Some(key) = chunk?.into_iter().next() {
                return Ok(Some(key));
            }
        }
        Ok(None)
    }
}
