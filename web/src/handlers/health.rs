//! Health check endpoint.

use crate::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server answers at all
    status: &'static str,
    /// Number of connected WebSocket subscribers
    subscribers: usize,
}

/// GET `/health`: liveness plus the current subscriber count.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        subscribers: state.hub.subscriber_count(),
    })
}
