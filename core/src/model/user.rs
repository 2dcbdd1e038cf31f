//! Users and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed role enumeration.
///
/// Roles are a closed set checked exhaustively in the authorization
/// policy, so adding a role is a compile-time-visible change rather
/// than a silently-unmatched string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Moderates submissions; sees and may mutate everything.
    Admin,
    /// Publishes events; owns the events they create.
    Organizer,
    /// Responds to approved events.
    Attendee,
}

impl Role {
    /// Stable wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Organizer => "ORGANIZER",
            Self::Attendee => "ATTENDEE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::error::CoordinationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "ORGANIZER" => Ok(Self::Organizer),
            "ATTENDEE" => Ok(Self::Attendee),
            other => Err(crate::error::CoordinationError::validation(format!(
                "Unknown role: {other}"
            ))),
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity id
    pub id: UserId,
    /// Unique email address
    pub email: String,
    /// Assigned role (immutable in this engine)
    pub role: Role,
    /// Signup timestamp
    pub created_at: DateTime<Utc>,
}

/// Fields required to register a user.
///
/// Credential material (password, token minting) is handled by the
/// external access verifier, not stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    /// Unique email address
    pub email: String,
    /// Assigned role
    pub role: Role,
}

/// Organizer projection attached to event reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizerRef {
    /// Organizer email
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Admin, Role::Organizer, Role::Attendee] {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!("SUPERUSER".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Role::Attendee).unwrap_or_default();
        assert_eq!(json, r#""ATTENDEE""#);
    }
}
