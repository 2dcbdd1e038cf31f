//! Router configuration.

use crate::handlers::{events, health, rsvps, websocket};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete Axum router.
///
/// - Health check (no authentication)
/// - WebSocket broadcast stream (no authentication; it carries only
///   what the engine already published)
/// - Event and RSVP endpoints (bearer token required)
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ws", get(websocket::handle))
        .route("/events", post(events::create_event))
        .route("/events", get(events::list_events))
        .route("/events/:id", put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        .route("/events/:id/approve", put(events::approve_event))
        .route("/events/:id/rsvp", post(rsvps::respond))
        .route("/events/:id/rsvps", get(rsvps::list_rsvps))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
