//! RSVP coordination tests: uniqueness, overwrites, gating on the
//! approval state, and listing order.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use gatherly_core::prelude::*;
use std::sync::Arc;

struct Fixture {
    store: Arc<dyn RecordStore>,
    lifecycle: EventLifecycle,
    rsvps: RsvpCoordinator,
    admin: Identity,
    organizer: Identity,
    attendee: Identity,
}

async fn fixture() -> Fixture {
    let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
    let hub = Arc::new(BroadcastHub::new());
    let lifecycle = EventLifecycle::new(store.clone(), hub.clone());
    let rsvps = RsvpCoordinator::new(store.clone(), hub);

    let mut identities = Vec::new();
    for (email, role) in [
        ("admin@example.com", Role::Admin),
        ("organizer@example.com", Role::Organizer),
        ("attendee@example.com", Role::Attendee),
    ] {
        let user = store
            .create_user(NewUser {
                email: email.to_string(),
                role,
            })
            .await
            .unwrap();
        identities.push(Identity {
            user_id: user.id,
            email: user.email,
            role: user.role,
        });
    }
    let attendee = identities.pop().unwrap();
    let organizer = identities.pop().unwrap();
    let admin = identities.pop().unwrap();

    Fixture {
        store,
        lifecycle,
        rsvps,
        admin,
        organizer,
        attendee,
    }
}

impl Fixture {
    async fn approved_event(&self) -> EventId {
        let details = self
            .lifecycle
            .create_event(
                &self.admin,
                EventDraft {
                    title: "Meetup".to_string(),
                    description: "Monthly meetup".to_string(),
                    date: Some(Utc::now() + Duration::days(3)),
                    location: "Online".to_string(),
                },
            )
            .await
            .unwrap();
        details.event.id
    }

    async fn pending_event(&self) -> EventId {
        let details = self
            .lifecycle
            .create_event(
                &self.organizer,
                EventDraft {
                    title: "Pending meetup".to_string(),
                    description: "Awaiting approval".to_string(),
                    date: Some(Utc::now() + Duration::days(3)),
                    location: "Online".to_string(),
                },
            )
            .await
            .unwrap();
        details.event.id
    }
}

#[tokio::test]
async fn test_responding_twice_keeps_one_row() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;

    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap();
    let second = fx
        .rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::NotGoing)
        .await
        .unwrap();
    assert_eq!(second.rsvp.status, RsvpStatus::NotGoing);

    let rows = fx.rsvps.list_responses(&fx.admin, event_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rsvp.status, RsvpStatus::NotGoing);
}

#[tokio::test]
async fn test_list_responses_after_delete_is_empty() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;
    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap();

    fx.lifecycle.delete_event(&fx.admin, event_id).await.unwrap();

    let rows = fx.rsvps.list_responses(&fx.attendee, event_id).await.unwrap();
    assert!(rows.is_empty());

    // Ids that never existed read the same way.
    let rows = fx
        .rsvps
        .list_responses(&fx.attendee, EventId::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_respond_to_unknown_event_not_found() {
    let fx = fixture().await;
    let err = fx
        .rsvps
        .respond(&fx.attendee, EventId::new(), RsvpStatus::Going)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::NotFound { .. }));
}

#[tokio::test]
async fn test_pending_event_rejects_non_admin_responses() {
    let fx = fixture().await;
    let event_id = fx.pending_event().await;

    let err = fx
        .rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Authorization { .. }));

    // The organizer gets no exception for their own pending event.
    let err = fx
        .rsvps
        .respond(&fx.organizer, event_id, RsvpStatus::Going)
        .await
        .unwrap_err();
    assert!(matches!(err, CoordinationError::Authorization { .. }));

    // Admins may respond ahead of approval.
    fx.rsvps
        .respond(&fx.admin, event_id, RsvpStatus::Maybe)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_responses_listed_newest_first() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;

    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    fx.rsvps
        .respond(&fx.organizer, event_id, RsvpStatus::Maybe)
        .await
        .unwrap();

    let rows = fx.rsvps.list_responses(&fx.attendee, event_id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].user.email, "organizer@example.com");
    assert_eq!(rows[0].user.role, Role::Organizer);
    assert_eq!(rows[1].user.email, "attendee@example.com");
}

#[tokio::test]
async fn test_overwrite_preserves_position() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;

    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    fx.rsvps
        .respond(&fx.organizer, event_id, RsvpStatus::Going)
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    // Overwriting keeps the original creation time, so the attendee
    // stays in second place.
    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Maybe)
        .await
        .unwrap();

    let rows = fx.rsvps.list_responses(&fx.admin, event_id).await.unwrap();
    assert_eq!(rows[0].user.email, "organizer@example.com");
    assert_eq!(rows[1].user.email, "attendee@example.com");
    assert_eq!(rows[1].rsvp.status, RsvpStatus::Maybe);
}

#[tokio::test]
async fn test_concurrent_responses_from_one_user_yield_one_row() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;

    let mut handles = Vec::new();
    for status in [RsvpStatus::Going, RsvpStatus::Maybe, RsvpStatus::NotGoing] {
        let rsvps = fx.rsvps.clone();
        let actor = fx.attendee.clone();
        handles.push(tokio::spawn(async move {
            rsvps.respond(&actor, event_id, status).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let rows = fx.rsvps.list_responses(&fx.admin, event_id).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_event_details_include_responses() {
    let fx = fixture().await;
    let event_id = fx.approved_event().await;
    fx.rsvps
        .respond(&fx.attendee, event_id, RsvpStatus::Going)
        .await
        .unwrap();

    let listed = fx.lifecycle.list_events(&fx.attendee).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].rsvps.len(), 1);
    assert_eq!(listed[0].rsvps[0].user.email, "attendee@example.com");

    // Direct store read agrees with the engine's projection.
    let stored = fx
        .store
        .list_events(EventVisibility::ApprovedOnly)
        .await
        .unwrap();
    assert_eq!(stored[0].rsvps.len(), 1);
}
