//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::AdminSite;
use crate::search::SearchAggregator;

pub struct AppState {
    pub db: SqlitePool,
    pub site: Arc<AdminSite>,
    pub search: SearchAggregator,
}
