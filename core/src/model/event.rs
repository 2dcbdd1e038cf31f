//! Events and their approval lifecycle.

use super::rsvp::RsvpDetails;
use super::user::{OrganizerRef, UserId};
use crate::error::{CoordinationError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Approval state of an event.
///
/// The approval gate is the sole gate for attendee-visible existence.
/// The only transition is `Pending → Approved`; there is no way to
/// construct a de-approval, which makes the one-way invariant hold by
/// type rather than by convention. On the wire this is the `approved`
/// boolean clients already consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Approval {
    /// Visible only to the organizer and to admins.
    Pending,
    /// Visible to everyone.
    Approved,
}

impl Approval {
    /// Whether the gate is open.
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }

    /// The single allowed transition. Idempotent on `Approved`.
    #[must_use]
    pub const fn approve(self) -> Self {
        Self::Approved
    }
}

impl From<bool> for Approval {
    fn from(approved: bool) -> Self {
        if approved { Self::Approved } else { Self::Pending }
    }
}

impl From<Approval> for bool {
    fn from(approval: Approval) -> Self {
        approval.is_approved()
    }
}

/// A published (or pending) event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event id
    pub id: EventId,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Where the event takes place
    pub location: String,
    /// Owning organizer
    pub organizer_id: UserId,
    /// Approval gate (`approved` on the wire)
    #[serde(rename = "approved")]
    pub approval: Approval,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating an event.
///
/// All four content fields are required; `date` is optional here only
/// so that its absence surfaces as a validation error instead of a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventDraft {
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// When the event takes place
    pub date: Option<DateTime<Utc>>,
    /// Where the event takes place
    pub location: String,
}

impl EventDraft {
    /// Validate that every required field is present and non-empty.
    ///
    /// Returns the event date on success.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinationError::Validation`] if any field is missing
    /// or blank.
    pub fn validate(&self) -> Result<DateTime<Utc>> {
        let blank = self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location.trim().is_empty();
        match self.date {
            Some(date) if !blank => Ok(date),
            _ => Err(CoordinationError::validation("Missing required fields")),
        }
    }
}

/// Partial update to an event. Omitted fields keep their prior values.
///
/// The approval gate is deliberately not patchable; only the approve
/// operation moves it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    /// Replacement title
    pub title: Option<String>,
    /// Replacement description
    pub description: Option<String>,
    /// Replacement date
    pub date: Option<DateTime<Utc>>,
    /// Replacement location
    pub location: Option<String>,
}

impl EventPatch {
    /// Apply the present fields to `event`, leaving the rest untouched.
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(location) = &self.location {
            event.location.clone_from(location);
        }
    }
}

/// Event read projection: the record plus its organizer email and full
/// RSVP list, the shape every list/mutation response carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    /// The event record
    #[serde(flatten)]
    pub event: Event,
    /// Organizer projection
    pub organizer: OrganizerRef,
    /// All responses to this event
    pub rsvps: Vec<RsvpDetails>,
}

/// Minimal event projection attached to RSVP broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRef {
    /// Event id
    pub id: EventId,
    /// Event title
    pub title: String,
}
