//! Authentication and event-access checks at the HTTP layer.

mod common;

use axum::http::{Method, StatusCode};
use common::{alice, bob, body_json, build_test_app, dave, event_with, get_auth, send};
use santa_api::auth::jwt::{generate_access_token, JwtConfig};

#[tokio::test]
async fn test_missing_authorization_returns_401() {
    let app = build_test_app();
    let response = send(&app, Method::GET, "/api/v1/events/1", None, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn test_token_signed_with_wrong_secret_returns_401() {
    let app = build_test_app();
    let forged = generate_access_token(
        1,
        "Mallory",
        &JwtConfig {
            secret: "some-other-secret-entirely-unrelated".to_string(),
            access_token_expiry_mins: 15,
        },
    )
    .unwrap();

    let response = get_auth(&app, "/api/v1/events/1", &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_unknown_event_returns_404() {
    let app = build_test_app();
    let response = get_auth(&app, "/api/v1/events/4242", &alice()).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Event with id 4242 not found"
    );
}

#[tokio::test]
async fn test_non_member_cannot_view_event() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;

    let response = get_auth(&app, &format!("/api/v1/events/{event_id}"), &dave()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_organizer_view_flags_organizer() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;

    let response = get_auth(&app, &format!("/api/v1/events/{event_id}"), &alice()).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_organizer"], true);
    assert_eq!(json["data"]["participant_count"], 2);
}
