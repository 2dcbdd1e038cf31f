//! HTTP contract tests: statuses, response shapes, and the
//! authorization matrix as seen through the API.

#![allow(clippy::unwrap_used)]

use axum_test::TestServer;
use gatherly_core::mocks::StaticVerifier;
use gatherly_core::model::{NewUser, Role};
use gatherly_core::store::{InMemoryStore, RecordStore};
use gatherly_core::verifier::Identity;
use gatherly_web::{AppState, build_router};
use serde_json::{Value, json};
use std::sync::Arc;

const ADMIN: &str = "admin-token";
const ORGANIZER: &str = "organizer-token";
const ATTENDEE: &str = "attendee-token";

async fn server() -> TestServer {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    let hub = Arc::new(gatherly_core::broadcast::BroadcastHub::new());
    let verifier = Arc::new(StaticVerifier::new());

    for (token, email, role) in [
        (ADMIN, "admin@example.com", Role::Admin),
        (ORGANIZER, "organizer@example.com", Role::Organizer),
        (ATTENDEE, "attendee@example.com", Role::Attendee),
    ] {
        let user = store
            .create_user(NewUser {
                email: email.to_string(),
                role,
            })
            .await
            .unwrap();
        verifier.register(
            token,
            Identity {
                user_id: user.id,
                email: user.email,
                role: user.role,
            },
        );
    }

    let state = AppState::new(store, hub, verifier);
    TestServer::new(build_router(state)).unwrap()
}

fn draft() -> Value {
    json!({
        "title": "Team offsite",
        "description": "Two days of planning",
        "date": "2026-10-01T09:00:00Z",
        "location": "Lisbon"
    })
}

async fn create_event(server: &TestServer, token: &str) -> Value {
    let response = server
        .post("/events")
        .authorization_bearer(token)
        .json(&draft())
        .await;
    response.assert_status(http::StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = server().await;
    let response = server.get("/events").await;
    response.assert_status(http::StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "No token provided");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let server = server().await;
    let response = server.get("/events").authorization_bearer("bogus").await;
    response.assert_status(http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_attendee_cannot_create_event() {
    let server = server().await;
    let response = server
        .post("/events")
        .authorization_bearer(ATTENDEE)
        .json(&draft())
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_incomplete_draft_is_bad_request() {
    let server = server().await;
    let mut body = draft();
    body["date"] = Value::Null;
    let response = server
        .post("/events")
        .authorization_bearer(ORGANIZER)
        .json(&body)
        .await;
    response.assert_status(http::StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Missing required fields");
}

#[tokio::test]
async fn test_admin_event_created_approved() {
    let server = server().await;
    let body = create_event(&server, ADMIN).await;
    assert_eq!(body["message"], "Event created successfully and approved");
    assert_eq!(body["event"]["approved"], true);
    assert_eq!(body["event"]["organizer"]["email"], "admin@example.com");
}

#[tokio::test]
async fn test_organizer_event_pending_until_admin_approves() {
    let server = server().await;
    let body = create_event(&server, ORGANIZER).await;
    assert_eq!(
        body["message"],
        "Event created successfully (pending approval)"
    );
    assert_eq!(body["event"]["approved"], false);
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    // Invisible to non-admins, the organizer included.
    for token in [ATTENDEE, ORGANIZER] {
        let list = server
            .get("/events")
            .authorization_bearer(token)
            .await
            .json::<Value>();
        assert_eq!(list["count"], 0);
    }

    // Only an admin may approve.
    let response = server
        .put(&format!("/events/{event_id}/approve"))
        .authorization_bearer(ORGANIZER)
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);

    let response = server
        .put(&format!("/events/{event_id}/approve"))
        .authorization_bearer(ADMIN)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "Event approved successfully"
    );

    let list = server
        .get("/events")
        .authorization_bearer(ATTENDEE)
        .await
        .json::<Value>();
    assert_eq!(list["count"], 1);
    assert_eq!(list["events"][0]["approved"], true);
}

#[tokio::test]
async fn test_approve_unknown_event_not_found() {
    let server = server().await;
    let response = server
        .put(&format!("/events/{}/approve", uuid::Uuid::new_v4()))
        .authorization_bearer(ADMIN)
        .await;
    response.assert_status(http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_partial_update() {
    let server = server().await;
    let body = create_event(&server, ORGANIZER).await;
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    let response = server
        .put(&format!("/events/{event_id}"))
        .authorization_bearer(ORGANIZER)
        .json(&json!({ "title": "Renamed offsite" }))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>();
    assert_eq!(updated["event"]["title"], "Renamed offsite");
    assert_eq!(updated["event"]["location"], "Lisbon");

    // A stranger may not touch it.
    let response = server
        .put(&format!("/events/{event_id}"))
        .authorization_bearer(ATTENDEE)
        .json(&json!({ "title": "Hijacked" }))
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rsvp_defaults_to_going_and_overwrites() {
    let server = server().await;
    let body = create_event(&server, ADMIN).await;
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/events/{event_id}/rsvp"))
        .authorization_bearer(ATTENDEE)
        .json(&json!({}))
        .await;
    response.assert_status_ok();
    let first = response.json::<Value>();
    assert_eq!(first["message"], "RSVP GOING successfully");
    assert_eq!(first["rsvp"]["status"], "GOING");
    assert_eq!(first["rsvp"]["user"]["email"], "attendee@example.com");

    let response = server
        .post(&format!("/events/{event_id}/rsvp"))
        .authorization_bearer(ATTENDEE)
        .json(&json!({ "status": "MAYBE" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "RSVP MAYBE successfully"
    );

    let list = server
        .get(&format!("/events/{event_id}/rsvps"))
        .authorization_bearer(ADMIN)
        .await
        .json::<Value>();
    assert_eq!(list["rsvps"].as_array().unwrap().len(), 1);
    assert_eq!(list["rsvps"][0]["status"], "MAYBE");
    assert_eq!(list["rsvps"][0]["user"]["role"], "ATTENDEE");
}

#[tokio::test]
async fn test_rsvp_to_pending_event_forbidden_except_admin() {
    let server = server().await;
    let body = create_event(&server, ORGANIZER).await;
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/events/{event_id}/rsvp"))
        .authorization_bearer(ATTENDEE)
        .json(&json!({}))
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "Event not approved yet");

    let response = server
        .post(&format!("/events/{event_id}/rsvp"))
        .authorization_bearer(ADMIN)
        .json(&json!({}))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_rsvp_to_unknown_event_not_found() {
    let server = server().await;
    let response = server
        .post(&format!("/events/{}/rsvp", uuid::Uuid::new_v4()))
        .authorization_bearer(ATTENDEE)
        .json(&json!({}))
        .await;
    response.assert_status(http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_event() {
    let server = server().await;
    let body = create_event(&server, ADMIN).await;
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    let response = server
        .delete(&format!("/events/{event_id}"))
        .authorization_bearer(ATTENDEE)
        .await;
    response.assert_status(http::StatusCode::FORBIDDEN);

    let response = server
        .delete(&format!("/events/{event_id}"))
        .authorization_bearer(ADMIN)
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["message"],
        "Event deleted successfully"
    );

    let list = server
        .get("/events")
        .authorization_bearer(ADMIN)
        .await
        .json::<Value>();
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn test_rsvps_of_deleted_event_read_empty() {
    let server = server().await;
    let body = create_event(&server, ADMIN).await;
    let event_id = body["event"]["id"].as_str().unwrap().to_string();

    server
        .post(&format!("/events/{event_id}/rsvp"))
        .authorization_bearer(ATTENDEE)
        .json(&json!({}))
        .await
        .assert_status_ok();
    server
        .delete(&format!("/events/{event_id}"))
        .authorization_bearer(ADMIN)
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/events/{event_id}/rsvps"))
        .authorization_bearer(ATTENDEE)
        .await;
    response.assert_status_ok();
    let list = response.json::<Value>();
    assert_eq!(list["rsvps"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_health_reports_subscribers() {
    let server = server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn test_events_listed_by_date_ascending() {
    let server = server().await;
    for (title, date) in [
        ("Later", "2026-12-01T09:00:00Z"),
        ("Sooner", "2026-09-01T09:00:00Z"),
    ] {
        let mut body = draft();
        body["title"] = json!(title);
        body["date"] = json!(date);
        server
            .post("/events")
            .authorization_bearer(ADMIN)
            .json(&body)
            .await
            .assert_status(http::StatusCode::CREATED);
    }

    let list = server
        .get("/events")
        .authorization_bearer(ATTENDEE)
        .await
        .json::<Value>();
    assert_eq!(list["events"][0]["title"], "Sooner");
    assert_eq!(list["events"][1]["title"], "Later");
}
