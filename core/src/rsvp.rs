//! RSVP coordination.
//!
//! A response is keyed on `(user, event)`: responding again overwrites
//! the status in place, it never grows a second row. The uniqueness
//! guarantee itself lives in the store's upsert; this component adds
//! the policy gate and the broadcast.

use crate::broadcast::{BroadcastHub, Change};
use crate::error::{CoordinationError, Result};
use crate::model::{EventId, RsvpStatus, RsvpWithRefs, RsvpWithResponder};
use crate::policy::{self, Action};
use crate::store::RecordStore;
use crate::verifier::Identity;
use std::sync::Arc;
use tracing::info;

/// Records and lists event responses.
#[derive(Clone)]
pub struct RsvpCoordinator {
    store: Arc<dyn RecordStore>,
    hub: Arc<BroadcastHub>,
}

impl RsvpCoordinator {
    /// Create a coordinator over a store and a broadcast hub.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Record `actor`'s response to an event, overwriting any earlier
    /// one.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown event, an authorization
    /// error when the event is still pending and the actor is not an
    /// admin, or a storage error.
    pub async fn respond(
        &self,
        actor: &Identity,
        event_id: EventId,
        status: RsvpStatus,
    ) -> Result<RsvpWithRefs> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", event_id))?;
        policy::authorize(actor, Action::Respond(&event))?;

        let rsvp = self
            .store
            .upsert_rsvp(actor.user_id, event_id, status)
            .await?;
        info!(
            event_id = %event_id,
            responder = %actor.email,
            status = %status,
            "RSVP recorded"
        );
        self.hub.publish(Change::RsvpUpdated {
            rsvp: rsvp.clone(),
            event_id,
        });
        Ok(rsvp)
    }

    /// List responses to an event, newest first.
    ///
    /// Listing is open to any authenticated identity. Unknown or
    /// deleted events read as an empty list, so a cascade delete is
    /// immediately observable here.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    pub async fn list_responses(
        &self,
        _actor: &Identity,
        event_id: EventId,
    ) -> Result<Vec<RsvpWithResponder>> {
        self.store.list_rsvps(event_id).await
    }
}
