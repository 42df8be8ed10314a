//! Document finders over a schemaless key-value store.
//!
//! Look documents up by key, by position or by attribute conditions, and get
//! them back as typed values rebuilt from their stored `_type` tag.
//!
//! ```ignore
//! use ripple_rust::{Conditions, DocumentsExt, InMemoryStore, TypeRegistry};
//!
//! let store = InMemoryStore::new();
//! let registry = TypeRegistry::<Person>::new().register::<Employee>();
//! let people = store.documents::<Person>().with_registry(&registry);
//!
//! let ann = people.find("ann")?;                      // None when missing
//! let ann = people.find_strict("ann")?;               // DocumentNotFound when missing
//! let active = people.all_where(&Conditions::new().eq("status", "active"))?;
//! people.each(|person| println!("{}", person.key()))?;
//! ```

mod conditions;
mod config;
mod document;
mod error;
mod finder;
mod retrieval;
mod store;

pub use conditions::{compile, ConditionError, Conditions, Predicate};
pub use config::{FinderConfig, Quorum, Quorums};
pub use document::{
    instantiate, Document, Loaded, TypeRegistry, KEY_ATTRIBUTE, TYPE_ATTRIBUTE,
};
pub use error::{DocumentNotFound, FinderError, FinderResult};
pub use finder::{DocumentsExt, Findable, Finder, First, Last};
pub use retrieval::Retriever;
pub use store::{
    Attributes, EvaluateOptions, InMemoryStore, Match, RawRecord, RawStoreClient, ReadOptions,
    StoreError, StoreResult, VClock, JSON_CONTENT_TYPE,
};

// Derive macro for Document, shares the trait's name
pub use ripple_rust_macros::Document;
