//! In-memory record store.
//!
//! One mutex guards all three tables, so every operation the trait
//! requires to be atomic takes the lock exactly once. This is the
//! adapter tests and the demo server run against.

use super::RecordStore;
use crate::error::{CoordinationError, Result};
use crate::model::{
    Event, EventDetails, EventId, EventPatch, EventRef, NewUser, OrganizerRef, ResponderInfo,
    ResponderRef, Rsvp, RsvpDetails, RsvpStatus, RsvpWithRefs, RsvpWithResponder, User, UserId,
};
use crate::policy::EventVisibility;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    users_by_email: HashMap<String, UserId>,
    events: HashMap<EventId, Event>,
    rsvps: HashMap<(UserId, EventId), Rsvp>,
}

impl Tables {
    fn responder_email(&self, user_id: UserId) -> Result<String> {
        self.users
            .get(&user_id)
            .map(|user| user.email.clone())
            .ok_or_else(|| CoordinationError::storage(format!("Dangling user reference: {user_id}")))
    }

    fn event_details(&self, event: &Event) -> Result<EventDetails> {
        let organizer_email = self.responder_email(event.organizer_id)?;

        let mut rsvps: Vec<RsvpDetails> = self
            .rsvps
            .values()
            .filter(|rsvp| rsvp.event_id == event.id)
            .map(|rsvp| {
                Ok(RsvpDetails {
                    rsvp: rsvp.clone(),
                    user: ResponderRef {
                        email: self.responder_email(rsvp.user_id)?,
                    },
                })
            })
            .collect::<Result<_>>()?;
        rsvps.sort_by(|a, b| {
            b.rsvp
                .created_at
                .cmp(&a.rsvp.created_at)
                .then_with(|| a.rsvp.user_id.0.cmp(&b.rsvp.user_id.0))
        });

        Ok(EventDetails {
            event: event.clone(),
            organizer: OrganizerRef {
                email: organizer_email,
            },
            rsvps,
        })
    }
}

/// In-memory [`RecordStore`] adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| CoordinationError::storage("Record store mutex poisoned"))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.lock()?;
        if tables.users_by_email.contains_key(&new_user.email) {
            return Err(CoordinationError::conflict("User already exists"));
        }

        let user = User {
            id: UserId::new(),
            email: new_user.email,
            role: new_user.role,
            created_at: Utc::now(),
        };
        tables.users_by_email.insert(user.email.clone(), user.id);
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.lock()?;
        Ok(tables
            .users_by_email
            .get(email)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn insert_event(&self, event: Event) -> Result<EventDetails> {
        let mut tables = self.lock()?;
        let details = tables.event_details(&event)?;
        tables.events.insert(event.id, event);
        Ok(details)
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn apply_event_patch(
        &self,
        id: EventId,
        patch: EventPatch,
    ) -> Result<Option<EventDetails>> {
        let mut tables = self.lock()?;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(event);
        let event = event.clone();
        tables.event_details(&event).map(Some)
    }

    async fn mark_event_approved(&self, id: EventId) -> Result<Option<EventDetails>> {
        let mut tables = self.lock()?;
        let Some(event) = tables.events.get_mut(&id) else {
            return Ok(None);
        };
        event.approval = event.approval.approve();
        let event = event.clone();
        tables.event_details(&event).map(Some)
    }

    async fn delete_event(&self, id: EventId) -> Result<Option<Event>> {
        let mut tables = self.lock()?;
        let Some(event) = tables.events.remove(&id) else {
            return Ok(None);
        };
        tables.rsvps.retain(|(_, event_id), _| *event_id != id);
        Ok(Some(event))
    }

    async fn list_events(&self, visibility: EventVisibility) -> Result<Vec<EventDetails>> {
        let tables = self.lock()?;
        let mut events: Vec<&Event> = tables
            .events
            .values()
            .filter(|event| match visibility {
                EventVisibility::All => true,
                EventVisibility::ApprovedOnly => event.approval.is_approved(),
            })
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.0.cmp(&b.id.0)));

        events
            .into_iter()
            .map(|event| tables.event_details(event))
            .collect()
    }

    async fn upsert_rsvp(
        &self,
        user_id: UserId,
        event_id: EventId,
        status: RsvpStatus,
    ) -> Result<RsvpWithRefs> {
        let mut tables = self.lock()?;
        let Some(event) = tables.events.get(&event_id) else {
            return Err(CoordinationError::not_found("Event", event_id));
        };
        let event_ref = EventRef {
            id: event.id,
            title: event.title.clone(),
        };
        let email = tables.responder_email(user_id)?;

        let rsvp = tables
            .rsvps
            .entry((user_id, event_id))
            .and_modify(|existing| existing.status = status)
            .or_insert_with(|| Rsvp {
                user_id,
                event_id,
                status,
                created_at: Utc::now(),
            })
            .clone();

        Ok(RsvpWithRefs {
            rsvp,
            user: ResponderRef { email },
            event: event_ref,
        })
    }

    async fn list_rsvps(&self, event_id: EventId) -> Result<Vec<RsvpWithResponder>> {
        let tables = self.lock()?;
        let mut rows: Vec<RsvpWithResponder> = tables
            .rsvps
            .values()
            .filter(|rsvp| rsvp.event_id == event_id)
            .map(|rsvp| {
                let user = tables
                    .users
                    .get(&rsvp.user_id)
                    .ok_or_else(|| {
                        CoordinationError::storage(format!(
                            "Dangling user reference: {}",
                            rsvp.user_id
                        ))
                    })?;
                Ok(RsvpWithResponder {
                    rsvp: rsvp.clone(),
                    user: ResponderInfo {
                        email: user.email.clone(),
                        role: user.role,
                    },
                })
            })
            .collect::<Result<_>>()?;
        rows.sort_by(|a, b| {
            b.rsvp
                .created_at
                .cmp(&a.rsvp.created_at)
                .then_with(|| a.rsvp.user_id.0.cmp(&b.rsvp.user_id.0))
        });
        Ok(rows)
    }
}
