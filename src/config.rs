//! Finder configuration: replica quorums used by the read path.
//!
//! Configuration is plain serde data so it can be loaded from whatever format
//! the application already uses.
//!
//! ```ignore
//! let config: FinderConfig = serde_json::from_str(r#"{ "quorums": { "r": 2 } }"#)?;
//! let people = store.documents::<Person>().with_config(&config);
//! ```

use serde::{Deserialize, Serialize};

use crate::store::ReadOptions;

/// How many replicas must answer before an operation is considered successful.
///
/// Serializes as `"one"`, `"quorum"`, `"all"`, `"default"` or a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quorum {
    One,
    #[default]
    Quorum,
    All,
    /// Use whatever the bucket properties say.
    #[serde(rename = "default")]
    BucketDefault,
    #[serde(untagged)]
    N(u32),
}

/// Per-operation quorums. Only `r` is consulted by finders; the write-side
/// values are carried for the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Quorums {
    pub r: Quorum,
    pub w: Quorum,
    pub dw: Quorum,
    pub rw: Quorum,
}

impl Quorums {
    /// Read options carrying only the read quorum.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions { r: Some(self.r) }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    pub quorums: Quorums,
}
