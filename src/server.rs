//! HTTP router assembly.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// Build the admin router. Search sits under the admin prefix next to the
/// other admin endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin = state.site.base_path().to_string();

    Router::new()
        .route("/api/health", get(api::health_check))
        .route(&format!("{}/search", admin), get(api::search::site_search))
        .route(&format!("{}/login", admin), post(api::auth::login))
        .route(&format!("{}/logout", admin), post(api::auth::logout))
        .route(&format!("{}/me", admin), get(api::auth::me))
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
