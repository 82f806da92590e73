//! HTTP-level tests for events, exclusion rules, draws, and manual edits.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener.

mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use common::{
    alice, assign, bob, body_json, build_test_app, carol, dave, delete_auth, event_with, exclude,
    get_auth, patch_json_auth, post_auth, post_json_auth, put_json_auth, token, ALICE, BOB, CAROL,
    DAVE,
};
use serde_json::{json, Value};

/// Assert that a list of assignment views is a derangement over `ids`.
fn assert_bijection(views: &Value, ids: &[i64]) {
    let views = views.as_array().unwrap();
    let expected: HashSet<i64> = ids.iter().copied().collect();
    let givers: HashSet<i64> = views
        .iter()
        .map(|v| v["giver"]["id"].as_i64().unwrap())
        .collect();
    let receivers: HashSet<i64> = views
        .iter()
        .map(|v| v["receiver"]["id"].as_i64().unwrap())
        .collect();
    assert_eq!(views.len(), ids.len());
    assert_eq!(givers, expected);
    assert_eq!(receivers, expected);
    for v in views {
        assert_ne!(v["giver"]["id"], v["receiver"]["id"]);
    }
}

// ---------------------------------------------------------------------------
// Events and joining
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_event_returns_201_with_join_code() {
    let app = build_test_app();
    let response = post_json_auth(
        &app,
        "/api/v1/events",
        &alice(),
        json!({ "name": "  Family exchange  " }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Family exchange");
    assert_eq!(json["data"]["organizer_id"], ALICE);
    assert_eq!(json["data"]["draw_completed"], false);
    assert_eq!(json["data"]["join_code"].as_str().unwrap().len(), 9);
}

#[tokio::test]
async fn test_create_event_with_blank_name_returns_400() {
    let app = build_test_app();
    let response =
        post_json_auth(&app, "/api/v1/events", &alice(), json!({ "name": "   " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_join_normalizes_code_and_is_idempotent() {
    let app = build_test_app();
    let (event_id, code) = common::create_event(&app, &alice(), "Party").await;

    let sloppy = format!("  {}  ", code.to_ascii_lowercase());
    let first = post_json_auth(
        &app,
        "/api/v1/events/join",
        &bob(),
        json!({ "join_code": sloppy }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_eq!(json["data"]["event_id"], event_id);
    assert_eq!(json["data"]["already_member"], false);

    let second = post_json_auth(
        &app,
        "/api/v1/events/join",
        &bob(),
        json!({ "join_code": code }),
    )
    .await;
    assert_eq!(body_json(second).await["data"]["already_member"], true);

    let response = get_auth(&app, &format!("/api/v1/events/{event_id}"), &bob()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["participant_count"], 2);
    assert_eq!(json["data"]["is_organizer"], false);
}

#[tokio::test]
async fn test_join_with_unknown_code_returns_400() {
    let app = build_test_app();
    let response = post_json_auth(
        &app,
        "/api/v1/events/join",
        &bob(),
        json!({ "join_code": "ZZZZZZZZZ" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_after_draw_returns_409() {
    let app = build_test_app();
    let (event_id, code) = common::create_event(&app, &alice(), "Party").await;
    common::join(&app, &bob(), &code).await;
    let drawn = post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;
    assert_eq!(drawn.status(), StatusCode::OK);

    let response = post_json_auth(
        &app,
        "/api/v1/events/join",
        &carol(),
        json!({ "join_code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_member_rejoining_after_draw_is_already_member() {
    let app = build_test_app();
    let (event_id, code) = common::create_event(&app, &alice(), "Party").await;
    common::join(&app, &bob(), &code).await;
    post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;

    let response = post_json_auth(
        &app,
        "/api/v1/events/join",
        &bob(),
        json!({ "join_code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["already_member"], true);
}

// ---------------------------------------------------------------------------
// Event details, update, delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_event_with_details() {
    let app = build_test_app();
    let response = post_json_auth(
        &app,
        "/api/v1/events",
        &alice(),
        json!({
            "name": "Family exchange",
            "description": "  Bring something handmade  ",
            "location": "   ",
            "budget": 25,
            "event_date": "2026-12-24T18:00:00Z",
            "draw_date": "2026-12-01T09:00:00Z",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let data = &body_json(response).await["data"];
    assert_eq!(data["description"], "Bring something handmade");
    assert!(data["location"].is_null());
    assert_eq!(data["budget"], 25);
    assert_eq!(data["event_date"], "2026-12-24T18:00:00Z");
}

#[tokio::test]
async fn test_create_event_with_draw_after_event_returns_400() {
    let app = build_test_app();
    let response = post_json_auth(
        &app,
        "/api/v1/events",
        &alice(),
        json!({
            "name": "Family exchange",
            "event_date": "2026-12-24T18:00:00Z",
            "draw_date": "2026-12-25T09:00:00Z",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_organizer_updates_only_supplied_fields() {
    let app = build_test_app();
    let (event_id, _) = common::create_event(&app, &alice(), "Party").await;

    let response = patch_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}"),
        &alice(),
        json!({ "location": "Break room", "budget": 20 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let data = &body_json(response).await["data"];
    assert_eq!(data["name"], "Party");
    assert_eq!(data["location"], "Break room");
    assert_eq!(data["budget"], 20);

    let response = patch_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}"),
        &alice(),
        json!({ "name": "Holiday party" }),
    )
    .await;
    let data = &body_json(response).await["data"];
    assert_eq!(data["name"], "Holiday party");
    assert_eq!(data["location"], "Break room");
}

#[tokio::test]
async fn test_update_with_zero_budget_returns_400() {
    let app = build_test_app();
    let (event_id, _) = common::create_event(&app, &alice(), "Party").await;

    let response = patch_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}"),
        &alice(),
        json!({ "budget": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Budget should be greater than 0"
    );
}

#[tokio::test]
async fn test_update_checks_dates_against_stored_values() {
    let app = build_test_app();
    let (event_id, _) = common::create_event(&app, &alice(), "Party").await;
    let uri = format!("/api/v1/events/{event_id}");

    let response = patch_json_auth(
        &app,
        &uri,
        &alice(),
        json!({ "event_date": "2026-12-24T18:00:00Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = patch_json_auth(
        &app,
        &uri,
        &alice(),
        json!({ "draw_date": "2026-12-30T18:00:00Z" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_participant_cannot_update_or_delete_event() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;
    let uri = format!("/api/v1/events/{event_id}");

    let response = patch_json_auth(&app, &uri, &bob(), json!({ "name": "Mine now" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&app, &uri, &bob()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(&app, &uri, &bob()).await;
    assert_eq!(body_json(response).await["data"]["name"], "Office party");
}

#[tokio::test]
async fn test_organizer_deletes_event_and_its_join_code() {
    let app = build_test_app();
    let (event_id, code) = common::create_event(&app, &alice(), "Party").await;
    common::join(&app, &bob(), &code).await;
    exclude(&app, event_id, ALICE, BOB).await;
    let uri = format!("/api/v1/events/{event_id}");

    let response = delete_auth(&app, &uri, &alice()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&app, &uri, &alice()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(&app, &uri, &alice()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        &app,
        "/api/v1/events/join",
        &carol(),
        json!({ "join_code": code }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Draw
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_draw_produces_derangement_sorted_by_giver_name() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol(), dave()]).await;

    let response = post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_bijection(&json["data"], &[ALICE, BOB, CAROL, DAVE]);

    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["giver"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol", "Dave"]);

    let listed = get_auth(&app, &format!("/api/v1/events/{event_id}/assignments"), &alice()).await;
    let listed = body_json(listed).await;
    assert_eq!(listed["data"]["draw_completed"], true);
    assert_bijection(&listed["data"]["assignments"], &[ALICE, BOB, CAROL, DAVE]);
}

#[tokio::test]
async fn test_draw_honors_exclusion_rules() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol(), dave()]).await;
    exclude(&app, event_id, ALICE, BOB).await;

    for _ in 0..10 {
        let response =
            post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;
        let json = body_json(response).await;
        let alice_entry = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|v| v["giver"]["id"] == ALICE)
            .cloned()
            .unwrap();
        assert_ne!(alice_entry["receiver"]["id"], BOB);
    }
}

#[tokio::test]
async fn test_infeasible_draw_returns_422_and_stores_nothing() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;
    exclude(&app, event_id, ALICE, BOB).await;
    exclude(&app, event_id, BOB, ALICE).await;

    let response = post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INFEASIBLE");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Could not find a valid assignment"));

    let listed = get_auth(&app, &format!("/api/v1/events/{event_id}/assignments"), &alice()).await;
    let listed = body_json(listed).await;
    assert_eq!(listed["data"]["draw_completed"], false);
    assert_eq!(listed["data"]["assignments"], json!([]));
}

#[tokio::test]
async fn test_draw_with_only_organizer_returns_422() {
    let app = build_test_app();
    let event_id = event_with(&app, &[]).await;

    let response = post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &alice()).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(response).await["code"], "INFEASIBLE");
}

#[tokio::test]
async fn test_participant_sees_only_own_receiver() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;
    assign(&app, event_id, &[(ALICE, BOB), (BOB, CAROL), (CAROL, ALICE)]).await;

    let response = get_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments/me"),
        &bob(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["draw_completed"], true);
    assert_eq!(json["data"]["receiver"]["id"], CAROL);
    assert_eq!(json["data"]["receiver"]["name"], "Carol");

    let full = get_auth(&app, &format!("/api/v1/events/{event_id}/assignments"), &bob()).await;
    assert_eq!(full.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_my_assignment_before_draw_is_null() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;

    let response = get_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments/me"),
        &bob(),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["draw_completed"], false);
    assert!(json["data"]["receiver"].is_null());
}

#[tokio::test]
async fn test_non_organizer_cannot_draw() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;

    let response = post_auth(&app, &format!("/api/v1/events/{event_id}/draw"), &bob()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Exclusion rules
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_rule_returns_409_and_keeps_one() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;
    exclude(&app, event_id, ALICE, BOB).await;

    let response = post_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/exclusions"),
        &alice(),
        json!({ "giver_id": ALICE, "forbidden_receiver_id": BOB }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Rule already exists");

    let listed = get_auth(&app, &format!("/api/v1/events/{event_id}/exclusions"), &alice()).await;
    let listed = body_json(listed).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_self_exclusion_rule_returns_400() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob()]).await;

    let response = post_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/exclusions"),
        &alice(),
        json!({ "giver_id": BOB, "forbidden_receiver_id": BOB }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_rule_by_query() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;
    exclude(&app, event_id, ALICE, BOB).await;

    let uri = format!(
        "/api/v1/events/{event_id}/exclusions?giver_id={ALICE}&forbidden_receiver_id={BOB}"
    );
    let response = delete_auth(&app, &uri, &alice()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], true);

    let again = delete_auth(&app, &uri, &alice()).await;
    assert_eq!(body_json(again).await["data"]["deleted"], false);
}

// ---------------------------------------------------------------------------
// Manual edit and clear
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_manual_edit_may_override_rules() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;
    exclude(&app, event_id, ALICE, BOB).await;

    let response = put_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
        json!({ "assignments": [
            { "giver_id": ALICE, "receiver_id": BOB },
            { "giver_id": BOB, "receiver_id": CAROL },
            { "giver_id": CAROL, "receiver_id": ALICE },
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_bijection(&body_json(response).await["data"], &[ALICE, BOB, CAROL]);
}

#[tokio::test]
async fn test_manual_edit_duplicate_receiver_returns_422_with_name() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;

    let response = put_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
        json!({ "assignments": [
            { "giver_id": ALICE, "receiver_id": BOB },
            { "giver_id": CAROL, "receiver_id": BOB },
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "REJECTED");
    assert_eq!(json["error"], "User Bob appears multiple times as a receiver");
}

#[tokio::test]
async fn test_manual_edit_incomplete_returns_422() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;

    let response = put_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
        json!({ "assignments": [{ "giver_id": ALICE, "receiver_id": BOB }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["error"],
        "Assignment must include all participants exactly once"
    );
}

#[tokio::test]
async fn test_manual_edit_with_stranger_returns_403() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;

    let response = put_json_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
        json!({ "assignments": [
            { "giver_id": ALICE, "receiver_id": 999 },
            { "giver_id": BOB, "receiver_id": CAROL },
            { "giver_id": CAROL, "receiver_id": ALICE },
        ]}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Assignment includes non-participant users");
}

#[tokio::test]
async fn test_clear_resets_draw() {
    let app = build_test_app();
    let event_id = event_with(&app, &[bob(), carol()]).await;
    assign(&app, event_id, &[(ALICE, CAROL), (CAROL, BOB), (BOB, ALICE)]).await;

    let response = delete_auth(
        &app,
        &format!("/api/v1/events/{event_id}/assignments"),
        &alice(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let listed = get_auth(&app, &format!("/api/v1/events/{event_id}/assignments"), &alice()).await;
    let listed = body_json(listed).await;
    assert_eq!(listed["data"]["draw_completed"], false);
    assert_eq!(listed["data"]["assignments"], json!([]));

    // Joining reopens once the draw is cleared.
    let event = get_auth(&app, &format!("/api/v1/events/{event_id}"), &alice()).await;
    let code = body_json(event).await["data"]["join_code"]
        .as_str()
        .unwrap()
        .to_string();
    common::join(&app, &token(DAVE, "Dave"), &code).await;
}
