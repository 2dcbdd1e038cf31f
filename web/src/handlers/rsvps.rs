//! RSVP endpoints.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use gatherly_core::model::{EventId, RsvpStatus, RsvpWithRefs, RsvpWithResponder};
use serde::{Deserialize, Serialize};

/// Request body for responding to an event.
#[derive(Debug, Default, Deserialize)]
pub struct RsvpRequest {
    /// Desired status; omitted means `GOING`
    pub status: Option<RsvpStatus>,
}

/// Response carrying the recorded RSVP.
#[derive(Debug, Serialize)]
pub struct RsvpResponse {
    /// Human-readable outcome
    pub message: String,
    /// The recorded response with projections
    pub rsvp: RsvpWithRefs,
}

/// Response for RSVP listings.
#[derive(Debug, Serialize)]
pub struct RsvpListResponse {
    /// Human-readable outcome
    pub message: String,
    /// Responses, newest first
    pub rsvps: Vec<RsvpWithResponder>,
}

/// POST `/events/:id/rsvp`: record or overwrite the caller's
/// response.
pub async fn respond(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<EventId>,
    Json(request): Json<RsvpRequest>,
) -> Result<Json<RsvpResponse>, AppError> {
    let status = request.status.unwrap_or(RsvpStatus::Going);
    let rsvp = state.rsvps.respond(&actor, id, status).await?;
    Ok(Json(RsvpResponse {
        message: format!("RSVP {status} successfully"),
        rsvp,
    }))
}

/// GET `/events/:id/rsvps`: list responses to an event.
pub async fn list_rsvps(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<EventId>,
) -> Result<Json<RsvpListResponse>, AppError> {
    let rsvps = state.rsvps.list_responses(&actor, id).await?;
    Ok(Json(RsvpListResponse {
        message: "RSVPs fetched successfully".to_string(),
        rsvps,
    }))
}
