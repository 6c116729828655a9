//! Session authentication and the admin access guard.

use axum::response::Redirect;
use chrono::Utc;
use rand::Rng;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tower_cookies::Cookies;

pub const SESSION_COOKIE_NAME: &str = "rosteradmin_session";

const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The authenticated requester with their permission state loaded.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    perms: HashSet<String>,
}

impl AuthUser {
    pub fn new(
        id: &str,
        username: &str,
        is_staff: bool,
        is_superuser: bool,
        perms: HashSet<String>,
    ) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            is_staff,
            is_superuser,
            perms,
        }
    }

    /// Codenames look like "view_team". Superusers hold every permission
    /// without explicit grants.
    pub fn has_perm(&self, codename: &str) -> bool {
        self.is_superuser || self.perms.contains(codename)
    }
}

/// Create a session for the user, replacing any existing ones.
pub async fn create_session(user_id: &str, pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let token: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    let expires_at = Utc::now().timestamp() + SESSION_TTL_SECS;

    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;
    sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(token)
}

pub async fn delete_session(token: &str, pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolve the session cookie to an enabled user and their permissions.
/// Expired sessions and disabled accounts resolve to `None`.
pub async fn current_user(cookies: &Cookies, pool: &SqlitePool) -> Option<AuthUser> {
    let token = cookies.get(SESSION_COOKIE_NAME)?.value().to_string();

    let row: (String, String, bool, bool) = sqlx::query_as(
        "SELECT u.id, u.username, u.is_staff, u.is_superuser
         FROM users u JOIN sessions s ON s.user_id = u.id
         WHERE s.token = ? AND s.expires_at > ? AND u.enabled = 1",
    )
    .bind(&token)
    .bind(Utc::now().timestamp())
    .fetch_optional(pool)
    .await
    .ok()??;

    let perms: Vec<(String,)> =
        sqlx::query_as("SELECT codename FROM user_permissions WHERE user_id = ?")
            .bind(&row.0)
            .fetch_all(pool)
            .await
            .ok()?;

    Some(AuthUser {
        id: row.0,
        username: row.1,
        is_staff: row.2,
        is_superuser: row.3,
        perms: perms.into_iter().map(|(codename,)| codename).collect(),
    })
}

/// Admin views are staff-only. Anonymous and non-staff requests get a
/// redirect to the admin login carrying the original path in `next`.
pub async fn require_staff(
    cookies: &Cookies,
    pool: &SqlitePool,
    admin_base: &str,
    next: &str,
) -> Result<AuthUser, Redirect> {
    match current_user(cookies, pool).await {
        Some(user) if user.is_staff => Ok(user),
        _ => Err(Redirect::to(&format!(
            "{}/login/?next={}",
            admin_base, next
        ))),
    }
}
