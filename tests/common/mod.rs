//! Shared harness for the HTTP-level tests: an in-memory database, the
//! registered catalog, and request helpers that drive the router directly.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use rosteradmin_backend::search::{SearchAggregator, SearchMethod};
use rosteradmin_backend::state::AppState;
use rosteradmin_backend::{apps, auth, db, server};

pub const ADMIN_BASE: &str = "/admin";

pub struct TestApp {
    pub db: SqlitePool,
    pub router: Router,
}

/// Build an app over a fresh in-memory database. Nothing is seeded; each
/// test creates exactly the rows it needs.
pub async fn spawn_app(method: SearchMethod, debug: bool) -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    db::run_migrations(&pool).await.expect("migrations failed");

    let site = Arc::new(apps::build_admin_site(&pool, ADMIN_BASE));
    let aggregator = SearchAggregator::new(site.clone(), method.strategy(), debug);
    let state = Arc::new(AppState {
        db: pool.clone(),
        site,
        search: aggregator,
    });

    TestApp {
        db: pool,
        router: server::build_router(state),
    }
}

pub async fn spawn_default_app() -> TestApp {
    spawn_app(SearchMethod::ModelFields, false).await
}

// ---- users and sessions ----

/// Password every test user gets. Hashed at the lowest bcrypt cost to keep
/// the suite fast.
pub const TEST_PASSWORD: &str = "pass1234";

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    is_staff: bool,
    is_superuser: bool,
) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hash password");
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, email, is_staff, is_superuser, enabled, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(&hash)
    .bind(format!("{}@example.com", username))
    .bind(is_staff)
    .bind(is_superuser)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert user");
    id
}

pub async fn grant_perms(pool: &SqlitePool, user_id: &str, codenames: &[&str]) {
    for codename in codenames {
        sqlx::query("INSERT INTO user_permissions (user_id, codename) VALUES (?, ?)")
            .bind(user_id)
            .bind(codename)
            .execute(pool)
            .await
            .expect("insert permission");
    }
}

/// A logged-in session token for the user.
pub async fn login(pool: &SqlitePool, user_id: &str) -> String {
    auth::create_session(user_id, pool)
        .await
        .expect("create session")
}

/// A superuser plus a live session, the common fixture.
pub async fn superuser_session(app: &TestApp) -> String {
    let id = create_user(&app.db, "root", true, true).await;
    login(&app.db, &id).await
}

// ---- requests ----

pub async fn get(
    app: &TestApp,
    path: &str,
    token: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(
            header::COOKIE,
            format!("{}={}", auth::SESSION_COOKIE_NAME, token),
        );
    }
    let request = builder.body(Body::empty()).expect("build request");
    send(app, request).await
}

pub async fn post_json(
    app: &TestApp,
    path: &str,
    body: &Value,
    token: Option<&str>,
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(
            header::COOKIE,
            format!("{}={}", auth::SESSION_COOKIE_NAME, token),
        );
    }
    let request = builder
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router response");

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

/// Run a search as the given session and return the parsed body, asserting
/// the request succeeded.
pub async fn search(app: &TestApp, token: &str, query: &str) -> Value {
    let uri = format!("{}/search?q={}", ADMIN_BASE, encode_query(query));
    let (status, _, body) = get(app, &uri, Some(token)).await;
    assert_eq!(status, StatusCode::OK, "search failed: {}", body);
    body
}

/// Enough encoding for the queries the tests use.
fn encode_query(query: &str) -> String {
    query.replace(' ', "%20")
}

// ---- response helpers ----

pub fn counts(body: &Value) -> (u64, u64, u64) {
    (
        body["counts"]["apps"].as_u64().expect("counts.apps"),
        body["counts"]["models"].as_u64().expect("counts.models"),
        body["counts"]["objects"].as_u64().expect("counts.objects"),
    )
}

pub fn app_entry<'a>(body: &'a Value, app_id: &str) -> &'a Value {
    body["results"]["apps"]
        .as_array()
        .expect("results.apps")
        .iter()
        .find(|a| a["id"] == app_id)
        .unwrap_or_else(|| panic!("app {:?} not in results: {}", app_id, body))
}

pub fn model_entry<'a>(body: &'a Value, app_id: &str, model_id: &str) -> &'a Value {
    app_entry(body, app_id)["models"]
        .as_array()
        .expect("app.models")
        .iter()
        .find(|m| m["id"] == model_id)
        .unwrap_or_else(|| panic!("model {:?} not in results: {}", model_id, body))
}

pub fn object_ids(model: &Value) -> Vec<String> {
    model["objects"]
        .as_array()
        .expect("model.objects")
        .iter()
        .map(|o| o["id"].as_str().expect("object.id").to_string())
        .collect()
}

// ---- club domain rows ----

fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub async fn create_team(pool: &SqlitePool, name: &str) -> i64 {
    create_team_detailed(pool, name, &slugify(name), "").await
}

pub async fn create_team_detailed(
    pool: &SqlitePool,
    name: &str,
    key: &str,
    description: &str,
) -> i64 {
    let now = now();
    sqlx::query(
        "INSERT INTO teams (name, key, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(name)
    .bind(key)
    .bind(description)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert team")
    .last_insert_rowid()
}

pub async fn create_player(pool: &SqlitePool, name: &str) -> i64 {
    let now = now();
    sqlx::query("INSERT INTO players (name, key, created_at, updated_at) VALUES (?, ?, ?, ?)")
        .bind(name)
        .bind(slugify(name))
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .expect("insert player")
        .last_insert_rowid()
}

pub async fn create_stadium(pool: &SqlitePool, name: &str) -> i64 {
    let now = now();
    sqlx::query(
        "INSERT INTO stadiums (name, key, capacity, created_at, updated_at) VALUES (?, ?, 50000, ?, ?)",
    )
    .bind(name)
    .bind(slugify(name))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert stadium")
    .last_insert_rowid()
}

pub async fn create_squad(pool: &SqlitePool, team_id: i64) -> i64 {
    let now = now();
    sqlx::query("INSERT INTO squads (team_id, created_at, updated_at) VALUES (?, ?, ?)")
        .bind(team_id)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .expect("insert squad")
        .last_insert_rowid()
}

pub async fn add_squad_player(pool: &SqlitePool, squad_id: i64, player_id: i64) {
    sqlx::query("INSERT INTO squad_players (squad_id, player_id) VALUES (?, ?)")
        .bind(squad_id)
        .bind(player_id)
        .execute(pool)
        .await
        .expect("insert squad player");
}

pub async fn create_player_attributes(pool: &SqlitePool, player_id: i64, nationality: &str) {
    let now = now();
    sqlx::query(
        "INSERT INTO player_attributes (player_id, position, nationality, age, created_at, updated_at)
         VALUES (?, 'ST', ?, 23, ?, ?)",
    )
    .bind(player_id)
    .bind(nationality)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert player attributes");
}
