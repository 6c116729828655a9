//! Login and logout endpoints for the admin console.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tower_cookies::{Cookie, Cookies};

use crate::auth::{self, SESSION_COOKIE_NAME};
use crate::models::{LoginRequest, User, UserInfo};
use crate::state::AppState;

type ApiError = (StatusCode, Json<Value>);

/// POST {admin}/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE username = ? AND enabled = 1")
            .bind(&payload.username)
            .fetch_optional(&state.db)
            .await
            .map_err(internal_error)?;

    let Some(user) = user else {
        return Err(unauthorized());
    };
    if !bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false) {
        return Err(unauthorized());
    }

    let token = auth::create_session(&user.id, &state.db)
        .await
        .map_err(internal_error)?;

    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);

    Ok(Json(json!({ "user": UserInfo::from(&user) })))
}

/// POST {admin}/logout
pub async fn logout(State(state): State<Arc<AppState>>, cookies: Cookies) -> Json<Value> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) {
        let token = cookie.value().to_string();
        if let Err(err) = auth::delete_session(&token, &state.db).await {
            tracing::warn!("failed to delete session: {}", err);
        }
        let mut removal = Cookie::new(SESSION_COOKIE_NAME, "");
        removal.set_path("/");
        cookies.remove(removal);
    }
    Json(json!({ "success": true }))
}

/// GET {admin}/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, ApiError> {
    match auth::current_user(&cookies, &state.db).await {
        Some(user) => Ok(Json(json!({
            "id": user.id,
            "username": user.username,
            "is_staff": user.is_staff,
            "is_superuser": user.is_superuser,
        }))),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Not authenticated" })),
        )),
    }
}

fn internal_error<E: std::fmt::Display>(err: E) -> ApiError {
    tracing::error!("auth handler error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

fn unauthorized() -> ApiError {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid username or password" })),
    )
}
