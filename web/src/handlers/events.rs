//! Event management endpoints.

use crate::error::AppError;
use crate::extractors::CurrentUser;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gatherly_core::model::{EventDetails, EventDraft, EventId, EventPatch};
use serde::Serialize;

/// Response carrying a single event with projections.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Human-readable outcome
    pub message: String,
    /// The affected event
    pub event: EventDetails,
}

/// Response for event listings.
#[derive(Debug, Serialize)]
pub struct EventListResponse {
    /// Human-readable outcome
    pub message: String,
    /// Number of events returned
    pub count: usize,
    /// The visible events, date ascending
    pub events: Vec<EventDetails>,
}

/// Response for deletions; the record is gone, so only a message.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    /// Human-readable outcome
    pub message: String,
}

/// POST `/events`: create an event.
///
/// Admin-created events are approved immediately; organizer-created
/// ones enter the approval queue, and the response message says which.
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.lifecycle.create_event(&actor, draft).await?;
    let message = if event.event.approval.is_approved() {
        "Event created successfully and approved"
    } else {
        "Event created successfully (pending approval)"
    };
    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            message: message.to_string(),
            event,
        }),
    ))
}

/// GET `/events`: list events visible to the caller.
pub async fn list_events(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<EventListResponse>, AppError> {
    let events = state.lifecycle.list_events(&actor).await?;
    Ok(Json(EventListResponse {
        message: "Events fetched successfully".to_string(),
        count: events.len(),
        events,
    }))
}

/// PUT `/events/:id`: partially update an event.
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<EventId>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.lifecycle.update_event(&actor, id, patch).await?;
    Ok(Json(EventResponse {
        message: "Event updated successfully".to_string(),
        event,
    }))
}

/// PUT `/events/:id/approve`: open the approval gate.
pub async fn approve_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<EventId>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.lifecycle.approve_event(&actor, id).await?;
    Ok(Json(EventResponse {
        message: "Event approved successfully".to_string(),
        event,
    }))
}

/// DELETE `/events/:id`: delete an event and its RSVPs.
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<EventId>,
) -> Result<Json<DeletedResponse>, AppError> {
    state.lifecycle.delete_event(&actor, id).await?;
    Ok(Json(DeletedResponse {
        message: "Event deleted successfully".to_string(),
    }))
}
