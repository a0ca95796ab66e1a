//! HTTP API tests.
//!
//! Drive the full router (in-memory and file-backed stores) with
//! `tower::ServiceExt::oneshot` and check response shapes and statuses.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use exlog_core::config::ServerConfig;
use exlog_core::{JsonlStore, MemoryStore, UserStore};
use exlog_server::{app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn test_app_with(store: Arc<dyn UserStore>, legacy_error_status: bool) -> Router {
    exlog_core::logging::init_test();
    let server = ServerConfig {
        legacy_error_status,
        ..ServerConfig::default()
    };
    app(AppState::new(store), &server)
}

fn test_app() -> Router {
    test_app_with(Arc::new(MemoryStore::new()), false)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn create_user(app: &Router, username: &str) -> String {
    let (status, body) = send(app, post_json("/users", json!({ "username": username }))).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_end_to_end_example() {
    let app = test_app();

    let (status, created) = send(&app, post_json("/users", json!({ "username": "alice" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["username"], "alice");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, view) = send(
        &app,
        post_json(
            &format!("/users/{}/exercises", id),
            json!({ "description": "run", "duration": 30, "date": "2023-01-15" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        view,
        json!({
            "username": "alice",
            "description": "run",
            "duration": 30,
            "date": "Sun Jan 15 2023",
            "id": id,
        })
    );

    let (status, logs) = send(&app, get(&format!("/users/{}/logs?limit=1", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        logs,
        json!({
            "username": "alice",
            "count": 1,
            "id": id,
            "log": [{ "description": "run", "duration": 30, "date": "Sun Jan 15 2023" }],
        })
    );
}

#[tokio::test]
async fn test_list_users_omits_exercises() {
    let app = test_app();
    let alice = create_user(&app, "alice").await;
    create_user(&app, "bob").await;

    send(
        &app,
        post_json(
            &format!("/users/{}/exercises", alice),
            json!({ "description": "swim", "duration": 20 }),
        ),
    )
    .await;

    let (status, users) = send(&app, get("/users")).await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0], json!({ "username": "alice", "id": alice }));
    assert_eq!(users[1]["username"], "bob");
}

#[tokio::test]
async fn test_form_encoded_bodies() {
    let app = test_app();

    let (status, created) = send(&app, post_form("/api/users", "username=carol")).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, view) = send(
        &app,
        post_form(
            &format!("/api/users/{}/exercises", id),
            "description=pushups&duration=15&date=2024-01-01",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["duration"], 15);
    assert_eq!(view["date"], "Mon Jan 01 2024");
}

#[tokio::test]
async fn test_log_date_window_and_limit() {
    let app = test_app();
    let id = create_user(&app, "dave").await;

    for (description, date) in [
        ("a", "2023-01-01"),
        ("b", "2023-01-05"),
        ("c", "2023-01-10"),
        ("d", "2023-01-15"),
    ] {
        send(
            &app,
            post_json(
                &format!("/users/{}/exercises", id),
                json!({ "description": description, "duration": 10, "date": date }),
            ),
        )
        .await;
    }

    let (_, logs) = send(
        &app,
        get(&format!("/users/{}/logs?from=2023-01-05&to=2023-01-10", id)),
    )
    .await;
    assert_eq!(logs["count"], 2);
    assert_eq!(logs["log"][0]["description"], "b");
    assert_eq!(logs["log"][1]["description"], "c");

    let (_, logs) = send(
        &app,
        get(&format!("/users/{}/logs?from=2023-01-05&limit=2", id)),
    )
    .await;
    assert_eq!(logs["count"], 2);
    assert_eq!(logs["log"][1]["description"], "c");

    let (_, logs) = send(&app, get(&format!("/users/{}/logs?from=garbage", id))).await;
    assert_eq!(logs["count"], 4);
}

#[tokio::test]
async fn test_error_statuses() {
    let app = test_app();

    let (status, body) = send(&app, post_json("/users", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "username is required");

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/users/{}/logs", unknown))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("user not found: {}", unknown));

    let (status, body) = send(&app, get("/users/not-an-id/logs")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid user id"));

    let id = create_user(&app, "erin").await;
    let (status, body) = send(
        &app,
        post_json(
            &format!("/users/{}/exercises", id),
            json!({ "description": "run" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "duration is required");
}

#[tokio::test]
async fn test_malformed_body_is_json_error() {
    let app = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_legacy_mode_answers_errors_with_200() {
    let app = test_app_with(Arc::new(MemoryStore::new()), true);

    let unknown = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/users/{}/logs", unknown))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["error"].as_str().unwrap().starts_with("user not found"));

    // Unknown routes are not handler errors
    let response = app.clone().oneshot(get("/nowhere")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    for uri in ["/health", "/api/health"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let temp_dir = tempfile::tempdir().unwrap();

    let id = {
        let store = JsonlStore::open(temp_dir.path()).unwrap();
        let app = test_app_with(Arc::new(store), false);
        let id = create_user(&app, "frank").await;
        send(
            &app,
            post_json(
                &format!("/users/{}/exercises", id),
                json!({ "description": "row", "duration": "25", "date": "2023-06-01" }),
            ),
        )
        .await;
        id
    };

    let store = JsonlStore::open(temp_dir.path()).unwrap();
    let app = test_app_with(Arc::new(store), false);
    let (status, logs) = send(&app, get(&format!("/users/{}/logs", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs["username"], "frank");
    assert_eq!(logs["log"][0]["duration"], 25);
}

#[tokio::test]
async fn test_concurrent_appends_are_not_lost() {
    let app = test_app();
    let id = create_user(&app, "gina").await;

    let mut handles = Vec::new();
    for i in 0..25 {
        let app = app.clone();
        let uri = format!("/users/{}/exercises", id);
        handles.push(tokio::spawn(async move {
            send(
                &app,
                post_json(&uri, json!({ "description": format!("set {}", i), "duration": i })),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let (_, logs) = send(&app, get(&format!("/users/{}/logs", id))).await;
    assert_eq!(logs["count"], 25);
}
