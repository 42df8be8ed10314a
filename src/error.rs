use std::fmt;

use crate::conditions::ConditionError;
use crate::store::StoreError;

/// Returned by the strict finders when requested documents are missing.
///
/// ```ignore
/// match people.find_strict("badkey") {
///     Err(FinderError::NotFound(err)) => println!("{}", err),
///     other => { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNotFound {
    requested: Vec<String>,
    missing: Vec<String>,
}

impl DocumentNotFound {
    /// `missing` is every requested key absent from `found`, in requested order.
    pub fn new(requested: Vec<String>, found: &[&str]) -> Self {
        let missing = requested
            .iter()
            .filter(|key| !found.contains(&key.as_str()))
            .cloned()
            .collect();
        Self { requested, missing }
    }

    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

impl fmt::Display for DocumentNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.requested.as_slice() {
            [] => write!(f, "cannot find a document without a key"),
            [key] => write!(f, "document with key '{}' not found", key),
            _ => write!(
                f,
                "documents with keys {} not found",
                self.missing.join(", ")
            ),
        }
    }
}

impl std::error::Error for DocumentNotFound {}

/// Errors raised by finders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FinderError {
    /// The call itself was malformed, e.g. no key given.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    NotFound(#[from] DocumentNotFound),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// Any store failure other than a missing key, passed through untouched.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The record's attributes did not build the resolved type.
    #[error("cannot build {type_name} from record {key}: {message}")]
    Instantiate {
        key: String,
        type_name: String,
        message: String,
    },
}

/// Result alias for finder operations.
pub type FinderResult<T> = Result<T, FinderError>;
