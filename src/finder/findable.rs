use super::finder::Finder;
use crate::conditions::Conditions;
use crate::document::{Document, Loaded};
use crate::error::{DocumentNotFound, FinderError, FinderResult};
use crate::store::RawStoreClient;

/// Positional selector: the first document of the bucket or of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct First;

/// Positional selector: the last document of the bucket or of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Last;

/// Trait for types that can be used as find arguments.
pub trait Findable<D: Document> {
    /// What `find` returns.
    type Output;
    /// What `find_strict` returns once absence has been ruled out.
    type Required;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output>;

    /// Keys named by the argument, for not-found reporting.
    fn requested_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound>;
}

fn find_key<S, D>(finder: &Finder<'_, S, D>, key: &str) -> FinderResult<Option<Loaded<D>>>
where
    S: RawStoreClient + ?Sized,
    D: Document,
{
    if key.is_empty() {
        return Err(FinderError::InvalidArgument("find called with an empty key".into()));
    }
    finder.retriever().find_one(key)
}

fn find_keys<S, D, K>(
    finder: &Finder<'_, S, D>,
    keys: &[K],
) -> FinderResult<Vec<Option<Loaded<D>>>>
where
    S: RawStoreClient + ?Sized,
    D: Document,
    K: AsRef<str>,
{
    if keys.is_empty() {
        return Err(FinderError::InvalidArgument("find called with no keys".into()));
    }
    keys.iter().map(|key| find_key(finder, key.as_ref())).collect()
}

fn require_one<D>(
    output: Option<Loaded<D>>,
    requested: Vec<String>,
) -> Result<Loaded<D>, DocumentNotFound> {
    output.ok_or_else(|| DocumentNotFound::new(requested, &[]))
}

fn require_all<D: Document>(
    output: Vec<Option<Loaded<D>>>,
    requested: Vec<String>,
) -> Result<Vec<Loaded<D>>, DocumentNotFound> {
    if output.iter().all(Option::is_some) {
        return Ok(output.into_iter().flatten().collect());
    }
    let found: Vec<&str> = output.iter().flatten().map(|doc| doc.key()).collect();
    Err(DocumentNotFound::new(requested, &found))
}

fn owned_keys<K: AsRef<str>>(keys: &[K]) -> Vec<String> {
    keys.iter().map(|key| key.as_ref().to_string()).collect()
}

// Single key (&str)
impl<D: Document> Findable<D> for &str {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_key(finder, self)
    }

    fn requested_keys(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Single key (String)
impl<D: Document> Findable<D> for String {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_key(finder, self)
    }

    fn requested_keys(&self) -> Vec<String> {
        vec![self.clone()]
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Possibly absent key: `None` is a caller error, not a miss
impl<D: Document> Findable<D> for Option<&str> {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        match self {
            Some(key) => find_key(finder, key),
            None => Err(FinderError::InvalidArgument("find called without a key".into())),
        }
    }

    fn requested_keys(&self) -> Vec<String> {
        self.iter().map(|key| key.to_string()).collect()
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Slice of &str
impl<'k, D: Document> Findable<D> for &[&'k str] {
    type Output = Vec<Option<Loaded<D>>>;
    type Required = Vec<Loaded<D>>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_keys(finder, *self)
    }

    fn requested_keys(&self) -> Vec<String> {
        owned_keys(*self)
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound> {
        require_all(output, requested)
    }
}

// Fixed-size arrays
impl<'k, D: Document, const N: usize> Findable<D> for [&'k str; N] {
    type Output = Vec<Option<Loaded<D>>>;
    type Required = Vec<Loaded<D>>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_keys(finder, self.as_slice())
    }

    fn requested_keys(&self) -> Vec<String> {
        owned_keys(self.as_slice())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound> {
        require_all(output, requested)
    }
}

// Vec of &str
impl<'k, D: Document> Findable<D> for Vec<&'k str> {
    type Output = Vec<Option<Loaded<D>>>;
    type Required = Vec<Loaded<D>>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_keys(finder, self.as_slice())
    }

    fn requested_keys(&self) -> Vec<String> {
        owned_keys(self.as_slice())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound> {
        require_all(output, requested)
    }
}

// Vec of String
impl<D: Document> Findable<D> for Vec<String> {
    type Output = Vec<Option<Loaded<D>>>;
    type Required = Vec<Loaded<D>>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        find_keys(finder, self.as_slice())
    }

    fn requested_keys(&self) -> Vec<String> {
        self.clone()
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound> {
        require_all(output, requested)
    }
}

// First document of a full scan
impl<D: Document> Findable<D> for First {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        Ok(finder.all()?.into_iter().next())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Last document of a full scan
impl<D: Document> Findable<D> for Last {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        Ok(finder.all()?.pop())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// First match of a query
impl<D: Document> Findable<D> for (First, Conditions) {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        Ok(finder.all_where(&self.1)?.into_iter().next())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Last match of a query
impl<D: Document> Findable<D> for (Last, Conditions) {
    type Output = Option<Loaded<D>>;
    type Required = Loaded<D>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        Ok(finder.all_where(&self.1)?.pop())
    }

    fn require(
        output: Self::Output,
        requested: Vec<String>,
    ) -> Result<Loaded<D>, DocumentNotFound> {
        require_one(output, requested)
    }
}

// Every match of a query; an empty result is not a miss
impl<D: Document> Findable<D> for Conditions {
    type Output = Vec<Loaded<D>>;
    type Required = Vec<Loaded<D>>;

    fn find_in<S: RawStoreClient + ?Sized>(
        &self,
        finder: &Finder<'_, S, D>,
    ) -> FinderResult<Self::Output> {
        finder.all_where(self)
    }

    fn require(
        output: Self::Output,
        _requested: Vec<String>,
    ) -> Result<Self::Required, DocumentNotFound> {
        Ok(output)
    }
}
