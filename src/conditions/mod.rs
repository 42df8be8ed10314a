//! Conditions - compiling attribute equality conditions into store predicates.
//!
//! A [`Conditions`] set is an ordered list of `field == value` requirements.
//! [`compile`] turns it into a [`Predicate`], a structured filter the store
//! evaluates against every record of a bucket. Values travel as data inside
//! the predicate and are never spliced into program text, so a hostile value
//! can only fail to match.
//!
//! ## Example
//!
//! ```ignore
//! let conditions = Conditions::new().eq("status", "active").eq("owner", "ann");
//! let predicate = compile(&conditions)?;
//! let active = store.evaluate("tasks", &predicate, &EvaluateOptions::default())?;
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Attributes;

/// Ordered `field == value` requirements. Empty matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(String, Value)>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality requirement.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(field, value)| (field.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Conditions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Conditions {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl From<Attributes> for Conditions {
    fn from(attributes: Attributes) -> Self {
        attributes.into_iter().collect()
    }
}

/// A filter a store can evaluate natively.
///
/// Serializes as a tagged JSON object, e.g.
/// `{"op":"eq","field":"status","value":"active"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Always,
    Eq { field: String, value: Value },
    And { clauses: Vec<Predicate> },
}

impl Predicate {
    /// Evaluate against a record's attributes.
    ///
    /// Equality is JSON equality: no coercion between strings and numbers,
    /// and a missing field never matches.
    pub fn matches(&self, data: &Attributes) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Eq { field, value } => data.get(field) == Some(value),
            Predicate::And { clauses } => clauses.iter().all(|clause| clause.matches(data)),
        }
    }
}

/// Errors raised while compiling conditions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("condition {position} has an empty field name")]
    EmptyField { position: usize },
}

/// Compile conditions into a predicate. All entries must hold.
pub fn compile(conditions: &Conditions) -> Result<Predicate, ConditionError> {
    let mut clauses = Vec::with_capacity(conditions.len());
    for (position, (field, value)) in conditions.iter().enumerate() {
        if field.is_empty() {
            return Err(ConditionError::EmptyField { position });
        }
        clauses.push(Predicate::Eq {
            field: field.to_string(),
            value: value.clone(),
        });
    }

    Ok(match clauses.len() {
        0 => Predicate::Always,
        1 => clauses.remove(0),
        _ => Predicate::And { clauses },
    })
}
