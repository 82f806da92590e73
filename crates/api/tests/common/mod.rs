#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use santa_api::auth::jwt::{generate_access_token, JwtConfig};
use santa_api::config::{ServerConfig, StoreBackend};
use santa_api::router::build_app_router;
use santa_api::state::AppState;
use santa_core::draw::DrawConfig;
use santa_core::store::MemoryEventStore;
use serde_json::Value;
use tower::ServiceExt;

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const CAROL: i64 = 3;
pub const DAVE: i64 = 4;

/// Build a test `JwtConfig` with a known secret.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        draw: DrawConfig::default(),
        jwt: test_jwt_config(),
    }
}

/// Build the full application router over a fresh in-memory store.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack. The router is cheap to clone; clones share
/// the store.
pub fn build_test_app() -> Router {
    let config = test_config();
    let state = AppState {
        store: Arc::new(MemoryEventStore::new()),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Mint a bearer token for a user.
pub fn token(user_id: i64, name: &str) -> String {
    generate_access_token(user_id, name, &test_jwt_config()).unwrap()
}

pub fn alice() -> String {
    token(ALICE, "Alice")
}

pub fn bob() -> String {
    token(BOB, "Bob")
}

pub fn carol() -> String {
    token(CAROL, "Carol")
}

pub fn dave() -> String {
    token(DAVE, "Dave")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with an optional bearer token and optional JSON body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Scenario helpers
// ---------------------------------------------------------------------------

/// Create an event as `token`'s user and return `(event_id, join_code)`.
pub async fn create_event(app: &Router, token: &str, name: &str) -> (i64, String) {
    let response =
        post_json_auth(app, "/api/v1/events", token, serde_json::json!({ "name": name })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["data"]["id"].as_i64().unwrap(),
        json["data"]["join_code"].as_str().unwrap().to_string(),
    )
}

/// Join an event by code, asserting success.
pub async fn join(app: &Router, token: &str, join_code: &str) {
    let response = post_json_auth(
        app,
        "/api/v1/events/join",
        token,
        serde_json::json!({ "join_code": join_code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Alice organizes; the other tokens join. Returns the event id.
pub async fn event_with(app: &Router, members: &[String]) -> i64 {
    let (event_id, code) = create_event(app, &alice(), "Office party").await;
    for member in members {
        join(app, member, &code).await;
    }
    event_id
}

/// Add an exclusion rule as Alice, asserting it was created.
pub async fn exclude(app: &Router, event_id: i64, giver_id: i64, forbidden_receiver_id: i64) {
    let response = post_json_auth(
        app,
        &format!("/api/v1/events/{event_id}/exclusions"),
        &alice(),
        serde_json::json!({
            "giver_id": giver_id,
            "forbidden_receiver_id": forbidden_receiver_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// Store an explicit assignment as Alice via a manual edit.
pub async fn assign(app: &Router, event_id: i64, pairs: &[(i64, i64)]) {
    let assignments: Vec<Value> = pairs
        .iter()
        .map(|(g, r)| serde_json::json!({ "giver_id": g, "receiver_id": r }))
        .collect();
    let response = put_json_auth(
        app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
        serde_json::json!({ "assignments": assignments }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
