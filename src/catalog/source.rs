//! Data-access seam between the catalog and the stores behind it.
//!
//! The search core only ever issues one query shape: a bounded disjunction
//! of field comparisons. Stores answer with stringified primary keys and
//! display labels and stay free to order rows however they like.

use async_trait::async_trait;
use thiserror::Error;

/// One matched record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHit {
    /// Primary key rendered as text
    pub pk: String,
    /// Display label of the record
    pub label: String,
}

/// How a predicate compares a field against the query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOp {
    /// Case-insensitive substring containment
    Contains,
    /// Case-insensitive equality
    Exact,
}

/// Path to a field, either local or one relation hop away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    pub relation: Option<String>,
    pub field: String,
}

impl FieldPath {
    pub fn local(field: &str) -> Self {
        Self {
            relation: None,
            field: field.to_string(),
        }
    }

    pub fn related(relation: &str, field: &str) -> Self {
        Self {
            relation: Some(relation.to_string()),
            field: field.to_string(),
        }
    }

    /// Parse `"players.name"` into a related path and `"name"` into a
    /// local one.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('.') {
            Some((relation, field)) => Self::related(relation, field),
            None => Self::local(raw),
        }
    }
}

/// A single field comparison.
#[derive(Debug, Clone)]
pub struct FieldPredicate {
    pub path: FieldPath,
    pub op: MatchOp,
    pub value: String,
}

/// A bounded disjunctive query: a record matches when any predicate does.
#[derive(Debug, Clone)]
pub struct ObjectQuery {
    pub predicates: Vec<FieldPredicate>,
    /// Maximum number of records to return
    pub limit: u32,
    /// Deduplicate records before the limit applies. Required when relation
    /// traversal can fan one record out into several rows.
    pub distinct: bool,
}

/// Failure while resolving or querying a model's store.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown field {field:?} on {model}")]
    UnknownField { model: String, field: String },
    #[error("unknown relation {relation:?} on {model}")]
    UnknownRelation { model: String, relation: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A queryable record store for one registered model.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Records matching the query, at most `query.limit` of them.
    async fn find_matching(&self, query: &ObjectQuery) -> Result<Vec<ObjectHit>, SourceError>;
}
