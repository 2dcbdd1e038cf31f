//! Event lifecycle engine.
//!
//! Every mutation follows the same sequence: authorize, mutate through
//! the store, then broadcast. The broadcast happens only after the
//! store reports success, so subscribers never hear about a mutation
//! that did not commit.

use crate::broadcast::{BroadcastHub, Change};
use crate::error::{CoordinationError, Result};
use crate::model::{
    Approval, Event, EventDetails, EventDraft, EventId, EventPatch, Role,
};
use crate::policy::{self, Action};
use crate::store::RecordStore;
use crate::verifier::Identity;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Creates, approves, updates, deletes, and lists events.
#[derive(Clone)]
pub struct EventLifecycle {
    store: Arc<dyn RecordStore>,
    hub: Arc<BroadcastHub>,
}

impl EventLifecycle {
    /// Create an engine over a store and a broadcast hub.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, hub: Arc<BroadcastHub>) -> Self {
        Self { store, hub }
    }

    /// Create an event owned by `actor`.
    ///
    /// Events created by admins skip the approval queue; everyone
    /// else's start pending.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an incomplete draft, an
    /// authorization error for attendees, or a storage error.
    pub async fn create_event(&self, actor: &Identity, draft: EventDraft) -> Result<EventDetails> {
        policy::authorize(actor, Action::CreateEvent)?;
        let date = draft.validate()?;

        let approval = if actor.role == Role::Admin {
            Approval::Approved
        } else {
            Approval::Pending
        };
        let event = Event {
            id: EventId::new(),
            title: draft.title,
            description: draft.description,
            date,
            location: draft.location,
            organizer_id: actor.user_id,
            approval,
            created_at: Utc::now(),
        };

        let details = self.store.insert_event(event).await?;
        info!(
            event_id = %details.event.id,
            organizer = %actor.email,
            approved = details.event.approval.is_approved(),
            "Event created"
        );
        self.hub.publish(Change::EventCreated {
            event: details.clone(),
        });
        Ok(details)
    }

    /// Open the approval gate on a pending event. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an authorization error for non-admins, a not-found error
    /// for an unknown event, or a storage error.
    pub async fn approve_event(&self, actor: &Identity, id: EventId) -> Result<EventDetails> {
        policy::authorize(actor, Action::ApproveEvent)?;

        let details = self
            .store
            .mark_event_approved(id)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", id))?;
        info!(event_id = %id, admin = %actor.email, "Event approved");
        self.hub.publish(Change::EventApproved {
            event: details.clone(),
        });
        Ok(details)
    }

    /// Apply a partial update to an event's content fields.
    ///
    /// The approval gate never moves here, whatever the patch carries.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown event, an authorization
    /// error unless the actor owns the event or is an admin, or a
    /// storage error.
    pub async fn update_event(
        &self,
        actor: &Identity,
        id: EventId,
        patch: EventPatch,
    ) -> Result<EventDetails> {
        let event = self
            .store
            .find_event(id)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", id))?;
        policy::authorize(actor, Action::UpdateEvent(&event))?;

        let details = self
            .store
            .apply_event_patch(id, patch)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", id))?;
        info!(event_id = %id, actor = %actor.email, "Event updated");
        self.hub.publish(Change::EventUpdated {
            event: details.clone(),
        });
        Ok(details)
    }

    /// Delete an event and its RSVPs.
    ///
    /// Returns the removed record; the broadcast carries its former id
    /// and title.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown event, an authorization
    /// error unless the actor owns the event or is an admin, or a
    /// storage error.
    pub async fn delete_event(&self, actor: &Identity, id: EventId) -> Result<Event> {
        let event = self
            .store
            .find_event(id)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", id))?;
        policy::authorize(actor, Action::DeleteEvent(&event))?;

        let removed = self
            .store
            .delete_event(id)
            .await?
            .ok_or_else(|| CoordinationError::not_found("Event", id))?;
        info!(event_id = %id, actor = %actor.email, "Event deleted");
        self.hub.publish(Change::EventDeleted {
            event_id: removed.id,
            event_title: removed.title.clone(),
        });
        Ok(removed)
    }

    /// List events visible to `actor`, ordered by date ascending.
    ///
    /// Admins see everything; organizers and attendees see approved
    /// events only, their own pending ones included in neither case.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the adapter fails.
    pub async fn list_events(&self, actor: &Identity) -> Result<Vec<EventDetails>> {
        self.store.list_events(policy::visibility(actor.role)).await
    }
}
