//! The site-wide search endpoint.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// The raw query text; a missing parameter equals an empty query
    #[serde(default)]
    pub q: String,
}

/// GET {admin}/search: search applications, models and objects visible to
/// the requesting staff user. Anonymous and non-staff requests are
/// redirected to the admin login.
pub async fn site_search(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(params): Query<SearchParams>,
) -> Response {
    let admin = state.site.base_path();
    let next = format!("{}/search/", admin);
    let user = match auth::require_staff(&cookies, &state.db, admin, &next).await {
        Ok(user) => user,
        Err(redirect) => return redirect.into_response(),
    };

    let response = state.search.search(&user, &params.q).await;
    Json(response).into_response()
}
