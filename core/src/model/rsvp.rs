//! RSVPs: per-(user, event) response state.

use super::event::{EventId, EventRef};
use super::user::{Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsvpStatus {
    /// Attending
    Going,
    /// Undecided
    Maybe,
    /// Not attending
    NotGoing,
}

impl fmt::Display for RsvpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Going => "GOING",
            Self::Maybe => "MAYBE",
            Self::NotGoing => "NOT_GOING",
        };
        f.write_str(s)
    }
}

/// One user's response to one event.
///
/// The identity is the composite `(user_id, event_id)` pair; the store
/// enforces at most one row per pair via unique-key upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rsvp {
    /// Responding user
    pub user_id: UserId,
    /// Target event
    pub event_id: EventId,
    /// Current response
    pub status: RsvpStatus,
    /// First-response timestamp (preserved across upserts)
    pub created_at: DateTime<Utc>,
}

/// Responder projection attached to RSVPs inside event reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderRef {
    /// Responder email
    pub email: String,
}

/// Responder projection carried by the RSVP listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponderInfo {
    /// Responder email
    pub email: String,
    /// Responder role
    pub role: Role,
}

/// RSVP plus responder email, as embedded in [`super::EventDetails`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpDetails {
    /// The response record
    #[serde(flatten)]
    pub rsvp: Rsvp,
    /// Responder projection
    pub user: ResponderRef,
}

/// RSVP plus responder email and role, the RSVP-listing shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpWithResponder {
    /// The response record
    #[serde(flatten)]
    pub rsvp: Rsvp,
    /// Responder projection
    pub user: ResponderInfo,
}

/// RSVP plus user and event projections, the broadcast payload shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpWithRefs {
    /// The response record
    #[serde(flatten)]
    pub rsvp: Rsvp,
    /// Responder projection
    pub user: ResponderRef,
    /// Target-event projection
    pub event: EventRef,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&RsvpStatus::NotGoing).unwrap(),
            r#""NOT_GOING""#
        );
        let parsed: RsvpStatus = serde_json::from_str(r#""MAYBE""#).unwrap();
        assert_eq!(parsed, RsvpStatus::Maybe);
    }

    #[test]
    fn test_rsvp_json_is_camel_case() {
        let rsvp = Rsvp {
            user_id: UserId::new(),
            event_id: EventId::new(),
            status: RsvpStatus::Going,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&rsvp).unwrap();
        assert!(json.get("userId").is_some());
        assert!(json.get("eventId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
