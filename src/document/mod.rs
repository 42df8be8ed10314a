//! Documents - typed values materialized from raw store records.
//!
//! A [`Document`] names the bucket it lives in and the type tag it is stored
//! under. Records read back from the store are turned into [`Loaded`]
//! documents by [`instantiate`], which resolves the record's `_type` tag
//! through a [`TypeRegistry`] so a finder for a base type can return any
//! registered variant.
//!
//! ## Example
//!
//! ```ignore
//! use ripple_rust::Document;
//!
//! #[derive(Serialize, Deserialize, Clone, Document)]
//! #[document(bucket = "people")]
//! struct Person {
//!     #[serde(default)]
//!     key: String,
//!     name: String,
//! }
//! ```

mod instantiate;
mod registry;

use std::ops::Deref;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::store::{Attributes, RawRecord};

pub use instantiate::instantiate;
pub use registry::TypeRegistry;

/// Attribute carrying the concrete type name of a stored document.
pub const TYPE_ATTRIBUTE: &str = "_type";

/// Attribute the record key is exposed under when building a document.
pub const KEY_ATTRIBUTE: &str = "key";

/// Trait for types that can be found in a bucket.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Bucket holding documents of this type.
    const BUCKET: &'static str;

    /// Value of the `_type` attribute for this type.
    const TYPE_NAME: &'static str;

    fn key(&self) -> &str;

    fn set_key(&mut self, key: &str);

    /// Build from an attribute map that already carries a `key` attribute.
    ///
    /// Polymorphic base types that do not deserialize from a bare map
    /// override this.
    fn from_attributes(attributes: Attributes) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(attributes))
    }
}

/// A document together with where it came from.
#[derive(Debug, Clone)]
pub struct Loaded<D> {
    pub data: D,
    type_name: String,
    new: bool,
    robject: Option<RawRecord>,
}

impl<D: Document> Loaded<D> {
    /// A freshly built document that has never been stored.
    pub fn unsaved(data: D) -> Self {
        Self {
            data,
            type_name: D::TYPE_NAME.to_string(),
            new: true,
            robject: None,
        }
    }

    pub(crate) fn from_store(data: D, type_name: String, robject: RawRecord) -> Self {
        Self {
            data,
            type_name,
            new: false,
            robject: Some(robject),
        }
    }

    pub fn key(&self) -> &str {
        self.data.key()
    }

    /// The type the document was built as; the record's `_type` when it resolved.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// False for anything read from the store.
    pub fn is_new(&self) -> bool {
        self.new
    }

    /// The record this document was built from, kept for later writes.
    pub fn robject(&self) -> Option<&RawRecord> {
        self.robject.as_ref()
    }

    pub fn into_inner(self) -> D {
        self.data
    }
}

impl<D> Deref for Loaded<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.data
    }
}
