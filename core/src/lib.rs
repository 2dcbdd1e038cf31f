//! # Gatherly Core
//!
//! The event coordination engine behind Gatherly: role-gated event
//! publishing with an admin approval queue, unique-per-user RSVPs, and
//! live change broadcasts.
//!
//! ## Architecture
//!
//! Every mutation flows through the same pipeline:
//!
//! ```text
//! Identity → Policy check → Record store → Broadcast hub
//! ```
//!
//! - [`verifier`] resolves a bearer credential to an [`Identity`]
//! - [`policy`] holds the pure authorization rules
//! - [`store`] is the durable-storage capability (in-memory adapter
//!   built in, PostgreSQL behind the `postgres` feature)
//! - [`broadcast`] fans out one envelope per committed mutation
//! - [`lifecycle`] and [`rsvp`] tie the pipeline together
//!
//! ## Example
//!
//! ```rust,ignore
//! use gatherly_core::prelude::*;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
//! let hub = Arc::new(BroadcastHub::new());
//! let lifecycle = EventLifecycle::new(store.clone(), hub.clone());
//!
//! let details = lifecycle.create_event(&admin, draft).await?;
//! assert!(details.event.approval.is_approved());
//! ```

pub mod broadcast;
pub mod error;
pub mod lifecycle;
#[cfg(feature = "test-utils")]
pub mod mocks;
pub mod model;
pub mod policy;
pub mod rsvp;
pub mod store;
pub mod verifier;

pub use broadcast::{BroadcastHub, Change, Envelope, Subscription};
pub use error::{CoordinationError, Result};
pub use lifecycle::EventLifecycle;
pub use rsvp::RsvpCoordinator;
pub use store::{InMemoryStore, RecordStore};
pub use verifier::{AccessVerifier, Identity, SignedTokenVerifier};

/// Convenience re-exports for consumers that want the whole engine.
pub mod prelude {
    pub use crate::broadcast::{BroadcastHub, Change, Envelope, Subscription};
    pub use crate::error::{CoordinationError, Result};
    pub use crate::lifecycle::EventLifecycle;
    pub use crate::model::{
        Approval, Event, EventDetails, EventDraft, EventId, EventPatch, NewUser, Role, Rsvp,
        RsvpStatus, User, UserId,
    };
    pub use crate::policy::{Action, Decision, EventVisibility};
    pub use crate::rsvp::RsvpCoordinator;
    pub use crate::store::{InMemoryStore, RecordStore};
    pub use crate::verifier::{AccessVerifier, Identity, SignedTokenVerifier};
}
