//! TypeRegistry - resolves `_type` tags to constructors.

use std::collections::HashMap;
use std::fmt;

use super::Document;
use crate::store::Attributes;

type Factory<D> = Box<dyn Fn(Attributes) -> Result<D, serde_json::Error> + Send + Sync>;

/// Maps type names to constructors producing the base type `D`.
///
/// Populate one at startup with every concrete type that should come back
/// from a finder for `D`. Tags with no entry fall back to `D` itself.
///
/// ```ignore
/// let registry = TypeRegistry::<Person>::new()
///     .register::<Employee>()
///     .register::<Customer>();
/// let people = store.documents::<Person>().with_registry(&registry);
/// ```
pub struct TypeRegistry<D> {
    factories: HashMap<String, Factory<D>>,
}

impl<D: Document> Default for TypeRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> TypeRegistry<D> {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a concrete document type under its `TYPE_NAME`.
    pub fn register<E>(self) -> Self
    where
        E: Document,
        D: From<E>,
    {
        self.register_with(E::TYPE_NAME, |attributes| {
            E::from_attributes(attributes).map(D::from)
        })
    }

    /// Register a constructor under an arbitrary type name.
    pub fn register_with<F>(mut self, type_name: &str, factory: F) -> Self
    where
        F: Fn(Attributes) -> Result<D, serde_json::Error> + Send + Sync + 'static,
    {
        self.factories
            .insert(type_name.to_string(), Box::new(factory));
        self
    }

    pub(crate) fn resolve(&self, type_name: &str) -> Option<&Factory<D>> {
        self.factories.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl<D> fmt::Debug for TypeRegistry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("types", &names)
            .finish()
    }
}
