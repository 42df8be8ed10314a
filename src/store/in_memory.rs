//! InMemoryStore - BTreeMap-backed raw store for testing and development.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{
    Attributes, EvaluateOptions, Match, RawRecord, RawStoreClient, ReadOptions, StoreError,
    StoreResult, VClock, JSON_CONTENT_TYPE,
};
use crate::conditions::Predicate;
use crate::config::Quorum;
use crate::document::{Document, TYPE_ATTRIBUTE};

const DEFAULT_N_VAL: u32 = 3;
const DEFAULT_KEY_CHUNK_SIZE: usize = 100;

/// Internal stored representation of a value.
struct StoredValue {
    bytes: Vec<u8>,
    version: u64,
}

type Buckets = BTreeMap<String, BTreeMap<String, StoredValue>>;

/// In-memory store of JSON values, grouped by bucket.
///
/// Keys enumerate in sorted order here, but callers of [`RawStoreClient`]
/// must not rely on any ordering. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryStore {
    buckets: Arc<RwLock<Buckets>>,
    n_val: u32,
    key_chunk_size: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(RwLock::new(BTreeMap::new())),
            n_val: DEFAULT_N_VAL,
            key_chunk_size: DEFAULT_KEY_CHUNK_SIZE,
        }
    }

    /// Replica count that numeric read quorums are checked against.
    pub fn with_n_val(mut self, n_val: u32) -> Self {
        self.n_val = n_val;
        self
    }

    /// Number of keys per chunk yielded by `stream_keys`.
    pub fn with_key_chunk_size(mut self, size: usize) -> Self {
        self.key_chunk_size = size.max(1);
        self
    }

    /// Store an attribute map under `bucket/key`, replacing any previous value.
    pub fn put(&self, bucket: &str, key: &str, data: Attributes) -> StoreResult<RawRecord> {
        let bytes = serde_json::to_vec(&data).map_err(|e| StoreError::Serde(e.to_string()))?;

        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let values = buckets.entry(bucket.to_string()).or_default();
        let version = values.get(key).map(|v| v.version + 1).unwrap_or(1);
        values.insert(key.to_string(), StoredValue { bytes, version });

        Ok(RawRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            data,
            vclock: Some(vclock_for(version)),
        })
    }

    /// Store a JSON value, which must be an object.
    pub fn put_json(&self, bucket: &str, key: &str, value: Value) -> StoreResult<RawRecord> {
        match value {
            Value::Object(data) => self.put(bucket, key, data),
            other => Err(StoreError::Serde(format!(
                "expected a JSON object for {}/{}, got {}",
                bucket, key, other
            ))),
        }
    }

    /// Store a document in its bucket, tagged with its type name.
    pub fn put_document<D: Document>(&self, document: &D) -> StoreResult<RawRecord> {
        let mut data = match serde_json::to_value(document) {
            Ok(Value::Object(data)) => data,
            Ok(other) => {
                return Err(StoreError::Serde(format!(
                    "{} did not serialize to an object: {}",
                    D::TYPE_NAME,
                    other
                )))
            }
            Err(e) => return Err(StoreError::Serde(e.to_string())),
        };
        data.insert(TYPE_ATTRIBUTE.to_string(), Value::from(D::TYPE_NAME));
        self.put(D::BUCKET, document.key(), data)
    }

    /// Store raw bytes without validation. Lets tests plant undecodable values.
    pub fn put_bytes(&self, bucket: &str, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let values = buckets.entry(bucket.to_string()).or_default();
        let version = values.get(key).map(|v| v.version + 1).unwrap_or(1);
        values.insert(key.to_string(), StoredValue { bytes, version });
        Ok(())
    }

    /// Delete a key. Returns true if it existed.
    pub fn delete(&self, bucket: &str, key: &str) -> StoreResult<bool> {
        let mut buckets = self
            .buckets
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(buckets
            .get_mut(bucket)
            .map(|values| values.remove(key).is_some())
            .unwrap_or(false))
    }

    fn check_read_quorum(&self, options: &ReadOptions) -> StoreResult<()> {
        if let Some(Quorum::N(r)) = options.r {
            if r == 0 || r > self.n_val {
                return Err(StoreError::Request {
                    code: 400,
                    message: format!("r_val_unsatisfied: r={} n_val={}", r, self.n_val),
                });
            }
        }
        Ok(())
    }
}

fn vclock_for(version: u64) -> VClock {
    VClock::new(version.to_be_bytes().to_vec())
}

fn decode(bucket: &str, key: &str, bytes: &[u8]) -> StoreResult<Attributes> {
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::Serde(format!("{}/{}: {}", bucket, key, e)))
}

impl RawStoreClient for InMemoryStore {
    fn list_keys(&self, bucket: &str) -> StoreResult<Vec<String>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(buckets
            .get(bucket)
            .map(|values| values.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn stream_keys(
        &self,
        bucket: &str,
    ) -> StoreResult<Box<dyn Iterator<Item = StoreResult<Vec<String>>> + '_>> {
        let keys = self.list_keys(bucket)?;
        let chunks: Vec<Vec<String>> = keys
            .chunks(self.key_chunk_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(Box::new(chunks.into_iter().map(Ok::<_, StoreError>)))
    }

    fn get(&self, bucket: &str, key: &str, options: &ReadOptions) -> StoreResult<RawRecord> {
        self.check_read_quorum(options)?;

        let buckets = self
            .buckets
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let stored = buckets
            .get(bucket)
            .and_then(|values| values.get(key))
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;

        Ok(RawRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            data: decode(bucket, key, &stored.bytes)?,
            vclock: Some(vclock_for(stored.version)),
        })
    }

    fn evaluate(
        &self,
        bucket: &str,
        predicate: &Predicate,
        options: &EvaluateOptions,
    ) -> StoreResult<Vec<Match>> {
        let buckets = self
            .buckets
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let Some(values) = buckets.get(bucket) else {
            return Ok(Vec::new());
        };

        let mut matches = Vec::new();
        for (key, stored) in values.iter() {
            let data = decode(bucket, key, &stored.bytes)?;
            if predicate.matches(&data) {
                matches.push(Match {
                    key: key.clone(),
                    data,
                });
            }
        }

        if !options.keep {
            return Ok(Vec::new());
        }
        Ok(matches)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let buckets = self.buckets.read().map(|b| b.len()).unwrap_or(0);
        f.debug_struct("InMemoryStore")
            .field("buckets", &buckets)
            .field("n_val", &self.n_val)
            .finish()
    }
}
