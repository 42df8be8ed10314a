//! Raw store client - the boundary to the underlying key-value store.
//!
//! Finders never talk to a transport directly. Everything they need from the
//! store goes through [`RawStoreClient`]: listing keys, reading one key at a
//! read quorum, and evaluating a structured [`Predicate`] over a bucket.
//!
//! [`InMemoryStore`] implements the trait over a `BTreeMap` for tests and
//! embedding.

mod client;
mod in_memory;

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::config::Quorum;

pub use client::RawStoreClient;
pub use in_memory::InMemoryStore;

/// Attribute map of a stored document.
pub type Attributes = Map<String, Value>;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Opaque causality metadata attached to a stored value.
///
/// Formats as its base64 header form.
#[derive(Clone, PartialEq, Eq)]
pub struct VClock(Vec<u8>);

impl VClock {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Header form, as sent back on conditional writes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn from_base64(encoded: &str) -> Result<Self, StoreError> {
        STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| StoreError::Serde(format!("invalid vclock: {}", e)))
    }
}

impl fmt::Debug for VClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VClock").field(&self.to_base64()).finish()
    }
}

impl fmt::Display for VClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// A value as the store returned it: key, decoded attributes and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub data: Attributes,
    pub vclock: Option<VClock>,
}

impl RawRecord {
    /// Wrap a predicate match. Matches carry no store metadata.
    pub fn from_match(bucket: &str, matched: Match) -> Self {
        Self {
            bucket: bucket.to_string(),
            key: matched.key,
            content_type: JSON_CONTENT_TYPE.to_string(),
            data: matched.data,
            vclock: None,
        }
    }
}

/// One record accepted by a server-side predicate evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub key: String,
    pub data: Attributes,
}

/// Options for a single-key read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub r: Option<Quorum>,
}

/// Options for a bucket-wide predicate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Return the phase results to the caller.
    pub keep: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self { keep: true }
    }
}

/// Errors reported by a store client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No value stored under the key.
    #[error("not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The store answered with a failure status.
    #[error("request failed with status {code}: {message}")]
    Request { code: u16, message: String },

    #[error("store timed out: {0}")]
    Timeout(String),

    /// A stored value could not be encoded or decoded.
    #[error("store serialization error: {0}")]
    Serde(String),

    #[error("store error: {0}")]
    Storage(String),
}

impl StoreError {
    /// True for the missing-key condition, whichever way the transport reported it.
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::NotFound { .. } => true,
            StoreError::Request { code, .. } => *code == 404,
            _ => false,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
