//! HTTP-level behavior of the admin search endpoint.

mod common;

use axum::http::{header, StatusCode};
use common::*;
use serde_json::{json, Value};

#[tokio::test]
async fn test_anonymous_request_is_redirected_to_login() {
    let app = spawn_default_app().await;

    let (status, headers, _) = get(&app, "/admin/search?q=team", None).await;

    assert!(status.is_redirection());
    let location = headers[header::LOCATION].to_str().unwrap();
    assert!(location.starts_with("/admin/login/"));
    assert!(location.contains("next=/admin/search/"));
}

#[tokio::test]
async fn test_non_staff_user_is_redirected_to_login() {
    let app = spawn_default_app().await;
    let fan = create_user(&app.db, "fan", false, false).await;
    let token = login(&app.db, &fan).await;

    let (status, headers, _) = get(&app, "/admin/search?q=team", Some(&token)).await;

    assert!(status.is_redirection());
    assert!(headers[header::LOCATION]
        .to_str()
        .unwrap()
        .starts_with("/admin/login/"));
}

#[tokio::test]
async fn test_staff_user_gets_a_response() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;

    let (status, _, body) = get(&app, "/admin/search?q=team", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].is_object());
    assert!(body["counts"].is_object());
    assert!(body["errors"].is_array());
}

#[tokio::test]
async fn test_empty_query_returns_the_empty_response() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    create_team(&app.db, "Arsenal").await;

    let expected = json!({
        "results": { "apps": [] },
        "counts": { "apps": 0, "models": 0, "objects": 0 },
        "errors": [],
    });

    let body = search(&app, &token, "").await;
    assert_eq!(body, expected);

    // A missing parameter behaves like an empty one.
    let (status, _, body) = get(&app, "/admin/search", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_app_name_match_emits_the_app_without_models() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;

    let body = search(&app, &token, "authentication").await;

    assert_eq!(
        body["results"],
        json!({
            "apps": [{
                "id": "auth",
                "name": "Authentication and Authorization",
                "url": "/admin/auth/",
                "models": [],
            }]
        })
    );
    assert_eq!(counts(&body), (1, 0, 0));
}

#[tokio::test]
async fn test_model_match_by_field_name() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;

    let body = search(&app, &token, "capacity").await;

    assert_eq!(
        body["results"]["apps"],
        json!([{
            "id": "stadiums",
            "name": "Stadiums",
            "url": "/admin/stadiums/",
            "models": [{
                "id": "stadiums.Stadium",
                "name": "Stadiums",
                "url": "/admin/stadiums/stadium/",
                "url_add": "/admin/stadiums/stadium/add/",
                "objects": [],
            }],
        }])
    );
    assert_eq!(counts(&body), (1, 1, 0));
}

#[tokio::test]
async fn test_model_match_by_field_label() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;

    let body = search(&app, &token, "playing surface").await;

    let pitch = model_entry(&body, "stadiums", "stadiums.Pitch");
    assert_eq!(pitch["url"], "/admin/stadiums/pitch/");
    assert_eq!(counts(&body), (1, 1, 0));
}

#[tokio::test]
async fn test_object_match_carries_id_name_and_url() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    let team_id = create_team(&app.db, "Arsenal").await;

    let body = search(&app, &token, "arsenal").await;

    let team = model_entry(&body, "teams", "teams.Team");
    assert_eq!(
        team["objects"],
        json!([{
            "id": team_id.to_string(),
            "name": "Arsenal",
            "url": format!("/admin/teams/team/{}", team_id),
        }])
    );
    assert_eq!(counts(&body), (1, 1, 1));
}

#[tokio::test]
async fn test_counts_sum_across_apps_models_and_objects() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    create_team(&app.db, "Manchester United").await;
    create_team(&app.db, "Manchester City").await;
    create_player(&app.db, "Manuel Akanji").await;
    create_stadium(&app.db, "Manchester Arena").await;

    let body = search(&app, &token, "man").await;

    assert_eq!(counts(&body), (3, 3, 4));
}

#[tokio::test]
async fn test_at_most_five_objects_per_model() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    for i in 0..8 {
        create_team(&app.db, &format!("Internal testers {}", i)).await;
    }

    let body = search(&app, &token, "internal").await;

    let team = model_entry(&body, "teams", "teams.Team");
    assert_eq!(object_ids(team).len(), 5);
    assert_eq!(counts(&body), (1, 1, 5));
}

#[tokio::test]
async fn test_matching_is_case_insensitive() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    create_stadium(&app.db, "City Stadium").await;

    let lower = search(&app, &token, "stadium").await;
    let mixed = search(&app, &token, "STADIum").await;

    assert_eq!(lower, mixed);
    // App name, model metadata and one object all match.
    assert_eq!(counts(&lower), (2, 3, 1));
}

#[tokio::test]
async fn test_repeating_a_query_gives_identical_results() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    create_team(&app.db, "Wanderers").await;

    let first = search(&app, &token, "wanderers").await;
    let second = search(&app, &token, "wanderers").await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_url_add_requires_the_add_permission() {
    let app = spawn_default_app().await;
    create_team(&app.db, "Hotspur").await;

    let viewer = create_user(&app.db, "viewer", true, false).await;
    grant_perms(&app.db, &viewer, &["view_team"]).await;
    let token = login(&app.db, &viewer).await;
    let body = search(&app, &token, "hotspur").await;
    let team = model_entry(&body, "teams", "teams.Team");
    assert_eq!(team["url_add"], Value::Null);
    assert_eq!(object_ids(team).len(), 1);

    let adder = create_user(&app.db, "adder", true, false).await;
    grant_perms(&app.db, &adder, &["view_team", "add_team"]).await;
    let token = login(&app.db, &adder).await;
    let body = search(&app, &token, "hotspur").await;
    let team = model_entry(&body, "teams", "teams.Team");
    assert_eq!(team["url_add"], "/admin/teams/team/add/");
}

#[tokio::test]
async fn test_change_permission_also_grants_view() {
    let app = spawn_default_app().await;
    create_team(&app.db, "Hotspur").await;
    let editor = create_user(&app.db, "editor", true, false).await;
    grant_perms(&app.db, &editor, &["change_team"]).await;
    let token = login(&app.db, &editor).await;

    let body = search(&app, &token, "hotspur").await;

    let team = model_entry(&body, "teams", "teams.Team");
    assert_eq!(object_ids(team).len(), 1);
    assert_eq!(team["url_add"], Value::Null);
}

#[tokio::test]
async fn test_add_permission_alone_does_not_grant_view() {
    let app = spawn_default_app().await;
    create_team(&app.db, "Hotspur").await;
    let adder = create_user(&app.db, "adder", true, false).await;
    grant_perms(&app.db, &adder, &["add_team"]).await;
    let token = login(&app.db, &adder).await;

    let body = search(&app, &token, "hotspur").await;

    assert_eq!(body["results"]["apps"], json!([]));
    assert_eq!(counts(&body), (0, 0, 0));
}

#[tokio::test]
async fn test_unpermitted_models_never_appear() {
    let app = spawn_default_app().await;
    create_player(&app.db, "Otis Rivers").await;
    let viewer = create_user(&app.db, "viewer", true, false).await;
    grant_perms(&app.db, &viewer, &["view_team"]).await;
    let token = login(&app.db, &viewer).await;

    // Would be an object hit with the right permission.
    let body = search(&app, &token, "rivers").await;
    assert_eq!(counts(&body), (0, 0, 0));

    // Matches the Players model metadata, which stays invisible too.
    let body = search(&app, &token, "player").await;
    assert_eq!(counts(&body), (0, 0, 0));
}

#[tokio::test]
async fn test_one_to_one_primary_key_objects_resolve() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    let player = create_player(&app.db, "Dele Okafor").await;
    create_player_attributes(&app.db, player, "Nigerian").await;

    let body = search(&app, &token, "nigerian").await;

    let attributes = model_entry(&body, "players", "players.PlayerAttributes");
    assert_eq!(
        attributes["objects"],
        json!([{
            "id": player.to_string(),
            "name": format!("Player attributes ({})", player),
            "url": format!("/admin/players/playerattributes/{}", player),
        }])
    );
}

#[tokio::test]
async fn test_model_failures_are_reported_when_debug_is_on() {
    let app = spawn_app(rosteradmin_backend::search::SearchMethod::ModelFields, true).await;
    let token = superuser_session(&app).await;
    create_team(&app.db, "Arsenal").await;
    sqlx::query("DROP TABLE stadiums")
        .execute(&app.db)
        .await
        .unwrap();

    let body = search(&app, &token, "arsenal").await;

    // The healthy models still answer.
    assert_eq!(counts(&body), (1, 1, 1));
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["app"], "stadiums");
    assert_eq!(errors[0]["model"], "Stadium");
    assert!(errors[0]["error"].as_str().unwrap().contains("Database"));
    assert!(errors[0]["error_message"]
        .as_str()
        .unwrap()
        .contains("no such table"));
}

#[tokio::test]
async fn test_model_failures_stay_silent_without_debug() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;
    create_team(&app.db, "Arsenal").await;
    sqlx::query("DROP TABLE stadiums")
        .execute(&app.db)
        .await
        .unwrap();

    let body = search(&app, &token, "arsenal").await;

    assert_eq!(body["errors"], json!([]));
    assert_eq!(counts(&body), (1, 1, 1));
}

#[tokio::test]
async fn test_login_sets_a_session_cookie() {
    let app = spawn_default_app().await;
    create_user(&app.db, "root", true, true).await;

    let (status, headers, body) = post_json(
        &app,
        "/admin/login",
        &json!({ "username": "root", "password": TEST_PASSWORD }),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "root");
    let cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("rosteradmin_session="));

    // The issued session authenticates follow-up requests.
    let token = cookie
        .trim_start_matches("rosteradmin_session=")
        .split(';')
        .next()
        .unwrap()
        .to_string();
    let (status, _, body) = get(&app, "/admin/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "root");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_default_app().await;
    create_user(&app.db, "root", true, true).await;

    let (status, _, body) = post_json(
        &app,
        "/admin/login",
        &json!({ "username": "root", "password": "wrong" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, _, _) = post_json(
        &app,
        "/admin/login",
        &json!({ "username": "nobody", "password": TEST_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_invalidates_the_session() {
    let app = spawn_default_app().await;
    let token = superuser_session(&app).await;

    let (status, _, _) = post_json(&app, "/admin/logout", &json!({}), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = get(&app, "/admin/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_default_app().await;

    let (status, _, body) = get(&app, "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
