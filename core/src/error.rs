//! Error types for coordination operations.

use thiserror::Error;

/// Result type alias for coordination operations.
pub type Result<T> = std::result::Result<T, CoordinationError>;

/// Error taxonomy for the event/RSVP coordination engine.
///
/// Every failure surfaced by the engine carries one of these kinds so
/// callers can map it to a stable response (HTTP status, retry policy)
/// without string matching. Broadcast failures to individual sinks are
/// deliberately absent: they are recovered locally by dropping the sink
/// and never reach the mutating caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinationError {
    /// Missing or malformed input, detected before any storage call.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the invalid input
        message: String,
    },

    /// The bearer credential is missing or failed verification.
    #[error("Invalid credential: {reason}")]
    Authentication {
        /// Reason the credential was rejected
        reason: String,
    },

    /// Authenticated, but the actor's role or ownership is insufficient.
    #[error("{reason}")]
    Authorization {
        /// Reason the action was denied
        reason: String,
    },

    /// The resource id does not resolve.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind, e.g. `"Event"`
        resource: &'static str,
        /// The id that failed to resolve
        id: String,
    },

    /// A unique-key constraint was violated (e.g. duplicate email).
    #[error("{message}")]
    Conflict {
        /// Description of the conflicting key
        message: String,
    },

    /// The record store or a collaborator failed. Not retried by the
    /// engine; the caller decides whether to retry.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CoordinationError {
    /// Build a [`CoordinationError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build a [`CoordinationError::Authentication`].
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Build a [`CoordinationError::Authorization`].
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Authorization {
            reason: reason.into(),
        }
    }

    /// Build a [`CoordinationError::NotFound`].
    pub fn not_found(resource: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Build a [`CoordinationError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Build a [`CoordinationError::Storage`].
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Returns `true` if this error is caused by the caller's input or
    /// permissions rather than an engine-side failure.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gatherly_core::error::CoordinationError;
    /// assert!(CoordinationError::validation("Missing required fields").is_user_error());
    /// assert!(!CoordinationError::storage("connection reset").is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Authentication { .. }
                | Self::Authorization { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
        )
    }
}
