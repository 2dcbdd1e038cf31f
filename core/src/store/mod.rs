//! Record store capability.
//!
//! The engine consumes durable storage through this trait; everything
//! with non-trivial concurrency semantics (the RSVP unique-key upsert,
//! the approve flip, the cascade delete) is pushed down here so the
//! adapter's native atomicity is the only concurrency control. The
//! engine adds no locking on top.

use crate::error::Result;
use crate::model::{
    Event, EventDetails, EventId, EventPatch, NewUser, RsvpStatus, RsvpWithRefs,
    RsvpWithResponder, User, UserId,
};
use crate::policy::EventVisibility;
use async_trait::async_trait;

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// Durable record store for users, events, and RSVPs.
///
/// Implementations must guarantee, per entity:
/// - `upsert_rsvp` is atomic on the `(user_id, event_id)` unique key:
///   concurrent calls for the same pair never produce two rows, and the
///   last write wins by the store's own commit order;
/// - `mark_event_approved` is an atomic flip, idempotent when the event
///   is already approved;
/// - `delete_event` removes the event and its RSVPs atomically as seen
///   by subsequent reads.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Register a user.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoordinationError::Conflict`] when the
    /// email is already registered.
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Look up a user by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    /// Look up a user by email.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Persist a new event and return it with its organizer projection.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the organizer record is missing or
    /// the adapter fails.
    async fn insert_event(&self, event: Event) -> Result<EventDetails>;

    /// Look up an event by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>>;

    /// Apply a partial update; omitted fields keep their prior values.
    ///
    /// Returns `None` when the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn apply_event_patch(
        &self,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Option<EventDetails>>;

    /// Open the approval gate. Idempotent when already approved.
    ///
    /// Returns `None` when the event does not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn mark_event_approved(&self, id: EventId) -> Result<Option<EventDetails>>;

    /// Delete an event and cascade-remove its RSVPs.
    ///
    /// Returns the removed record, or `None` when the event does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn delete_event(&self, id: EventId) -> Result<Option<Event>>;

    /// List events within `visibility`, ordered by date ascending, each
    /// with its organizer email and full RSVP list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn list_events(&self, visibility: EventVisibility) -> Result<Vec<EventDetails>>;

    /// Create or overwrite the response for `(user_id, event_id)`.
    ///
    /// The first response's creation time is preserved across
    /// overwrites.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CoordinationError::NotFound`] when the
    /// event does not exist, or a storage error if the adapter fails.
    async fn upsert_rsvp(
        &self,
        user_id: UserId,
        event_id: EventId,
        status: RsvpStatus,
    ) -> Result<RsvpWithRefs>;

    /// List responses for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<RsvpWithResponder>>;
}
