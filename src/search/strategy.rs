//! Pluggable object-matching strategies.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::catalog::{
    FieldPath, FieldPredicate, MatchOp, ModelDescriptor, ObjectHit, ObjectQuery, SourceError,
};

use super::OBJECT_LIMIT;

/// Which object-matching strategy the search runs with. One process-wide
/// switch, read from configuration at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// Containment over every text-like field declared on the model
    #[default]
    ModelFields,
    /// Delegate to the per-model registered search fields
    AdminFields,
}

impl SearchMethod {
    pub fn strategy(self) -> Arc<dyn ObjectSearch> {
        match self {
            SearchMethod::ModelFields => Arc::new(FieldContainsSearch),
            SearchMethod::AdminFields => Arc::new(AdminFieldsSearch),
        }
    }
}

/// Finds records of one model matching the query text.
#[async_trait]
pub trait ObjectSearch: Send + Sync {
    /// Up to [`OBJECT_LIMIT`] matching records. Errors are isolated to the
    /// model by the caller.
    async fn match_objects(
        &self,
        user: &AuthUser,
        query: &str,
        model: &ModelDescriptor,
    ) -> Result<Vec<ObjectHit>, SourceError>;
}

/// Default strategy: case-insensitive containment over every text-like
/// field of the model. Models without text-like fields never reach the
/// store.
pub struct FieldContainsSearch;

#[async_trait]
impl ObjectSearch for FieldContainsSearch {
    async fn match_objects(
        &self,
        _user: &AuthUser,
        query: &str,
        model: &ModelDescriptor,
    ) -> Result<Vec<ObjectHit>, SourceError> {
        let Some(source) = model.source.as_ref() else {
            return Ok(Vec::new());
        };

        let predicates: Vec<FieldPredicate> = model
            .fields
            .iter()
            .filter(|field| field.kind.is_text_like())
            .map(|field| FieldPredicate {
                path: FieldPath::local(&field.name),
                op: MatchOp::Contains,
                value: query.to_string(),
            })
            .collect();
        if predicates.is_empty() {
            return Ok(Vec::new());
        }

        source
            .find_matching(&ObjectQuery {
                predicates,
                limit: OBJECT_LIMIT,
                distinct: false,
            })
            .await
    }
}

/// Delegated strategy: match with the search fields registered on the
/// model. A `=` prefix requests exact matching and a dotted path traverses
/// a relation; models without registered search fields match nothing.
pub struct AdminFieldsSearch;

#[async_trait]
impl ObjectSearch for AdminFieldsSearch {
    async fn match_objects(
        &self,
        _user: &AuthUser,
        query: &str,
        model: &ModelDescriptor,
    ) -> Result<Vec<ObjectHit>, SourceError> {
        let Some(source) = model.source.as_ref() else {
            return Ok(Vec::new());
        };
        let Some(search_fields) = model.search_fields.as_ref().filter(|f| !f.is_empty()) else {
            return Ok(Vec::new());
        };

        let mut distinct = false;
        let predicates: Vec<FieldPredicate> = search_fields
            .iter()
            .map(|raw| {
                let (op, path) = parse_search_field(raw);
                // Relation joins can fan one record out into several rows.
                if path.relation.is_some() {
                    distinct = true;
                }
                FieldPredicate {
                    path,
                    op,
                    value: query.to_string(),
                }
            })
            .collect();

        source
            .find_matching(&ObjectQuery {
                predicates,
                limit: OBJECT_LIMIT,
                distinct,
            })
            .await
    }
}

/// Interpret one registered search field: `"=key"` means exact match on
/// `key`, `"team.name"` containment on the related field, plain names
/// containment on the local field.
fn parse_search_field(raw: &str) -> (MatchOp, FieldPath) {
    match raw.strip_prefix('=') {
        Some(rest) => (MatchOp::Exact, FieldPath::parse(rest)),
        None => (MatchOp::Contains, FieldPath::parse(raw)),
    }
}
