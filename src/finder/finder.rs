use super::findable::Findable;
use crate::conditions::Conditions;
use crate::config::FinderConfig;
use crate::document::{Document, Loaded, TypeRegistry};
use crate::error::{DocumentNotFound, FinderResult};
use crate::retrieval::Retriever;
use crate::store::RawStoreClient;

/// Typed finder for documents of type `D`.
///
/// Provides the lookup entry points by delegating to a [`Retriever`].
pub struct Finder<'a, S: ?Sized, D> {
    retriever: Retriever<'a, S, D>,
}

impl<'a, S: RawStoreClient + ?Sized, D: Document> Finder<'a, S, D> {
    pub fn new(store: &'a S) -> Self {
        Self {
            retriever: Retriever::new(store)
                .with_read_options(FinderConfig::default().quorums.read_options()),
        }
    }

    /// Read with the quorums from `config`.
    pub fn with_config(mut self, config: &FinderConfig) -> Self {
        self.retriever = self
            .retriever
            .with_read_options(config.quorums.read_options());
        self
    }

    /// Resolve `_type` tags through `registry`.
    pub fn with_registry(mut self, registry: &'a TypeRegistry<D>) -> Self {
        self.retriever = self.retriever.with_registry(registry);
        self
    }

    pub fn retriever(&self) -> &Retriever<'a, S, D> {
        &self.retriever
    }

    /// Find by key, keys, position or conditions. Missing data is never an
    /// error here: single lookups return `None`, key lists hold `None`
    /// placeholders.
    ///
    /// ```ignore
    /// let ann = people.find("ann")?;                        // Option<Loaded<Person>>
    /// let some = people.find(["ann", "bob"])?;              // Vec<Option<Loaded<Person>>>
    /// let head = people.find(First)?;                       // Option<Loaded<Person>>
    /// let active = people.find(Conditions::new().eq("status", "active"))?;
    /// ```
    pub fn find<F: Findable<D>>(&self, findable: F) -> FinderResult<F::Output> {
        findable.find_in(self)
    }

    /// Like [`find`](Self::find), but missing documents are a
    /// [`DocumentNotFound`] error.
    pub fn find_strict<F: Findable<D>>(&self, findable: F) -> FinderResult<F::Required> {
        let requested = findable.requested_keys();
        let found = findable.find_in(self)?;
        Ok(F::require(found, requested)?)
    }

    /// The document under the first key the store lists. The store decides
    /// that order; it is not the order documents were added.
    ///
    /// The listed key is read as-is; only caller-supplied keys are validated.
    pub fn first(&self) -> FinderResult<Option<Loaded<D>>> {
        match self.retriever.first_key()? {
            Some(key) => self.retriever.find_one(&key),
            None => Ok(None),
        }
    }

    /// Like [`first`](Self::first), failing when the bucket is empty.
    pub fn first_strict(&self) -> FinderResult<Loaded<D>> {
        match self.retriever.first_key()? {
            Some(key) => match self.retriever.find_one(&key)? {
                Some(found) => Ok(found),
                None => Err(DocumentNotFound::new(vec![key], &[]).into()),
            },
            None => Err(DocumentNotFound::new(Vec::new(), &[]).into()),
        }
    }

    /// Every document in the bucket.
    pub fn all(&self) -> FinderResult<Vec<Loaded<D>>> {
        self.retriever.scan_all()
    }

    /// Stream every document in the bucket through `visit` without holding
    /// them all in memory.
    pub fn each<F>(&self, visit: F) -> FinderResult<()>
    where
        F: FnMut(Loaded<D>),
    {
        self.retriever.scan_all_streaming(visit)
    }

    /// Every document matching `conditions`.
    pub fn all_where(&self, conditions: &Conditions) -> FinderResult<Vec<Loaded<D>>> {
        self.retriever.query(conditions)
    }

    /// The first document matching `conditions`, or an unsaved one from `build`.
    pub fn find_or_new<B>(&self, conditions: &Conditions, build: B) -> FinderResult<Loaded<D>>
    where
        B: FnOnce(&Conditions) -> D,
    {
        match self.all_where(conditions)?.into_iter().next() {
            Some(found) => Ok(found),
            None => Ok(Loaded::unsaved(build(conditions))),
        }
    }
}

/// Extension trait for typed document access on any RawStoreClient.
pub trait DocumentsExt: RawStoreClient + Sized {
    /// Get a typed finder.
    fn documents<D: Document>(&self) -> Finder<'_, Self, D> {
        Finder::new(self)
    }
}

impl<S: RawStoreClient> DocumentsExt for S {}
