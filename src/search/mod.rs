//! Site-wide admin search.
//!
//! One pass over the permission-filtered catalog: the query is matched
//! against application and model metadata and, through a pluggable
//! strategy, against live records. Results come back as the nested
//! application, model, object tree the admin frontend renders.

mod aggregator;
mod matchers;
mod strategy;

pub use aggregator::{
    AppResult, ModelResult, ObjectResult, SearchAggregator, SearchCounts, SearchErrorEntry,
    SearchResponse, SearchResults,
};
pub use matchers::{match_app, match_model};
pub use strategy::{AdminFieldsSearch, FieldContainsSearch, ObjectSearch, SearchMethod};

/// Maximum number of object matches returned per model.
pub const OBJECT_LIMIT: u32 = 5;
