//! Authorization policy.
//!
//! Pure decision functions over `(role, actor, action, resource)`.
//! No side effects, deterministic, and re-evaluated on every request;
//! decisions are never cached across requests. Role matches are
//! exhaustive so a new role fails to compile until every rule names it.

use crate::model::{Event, Role, UserId};
use crate::verifier::Identity;

/// An action an actor is attempting, together with the resource it
/// targets where one exists.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a> {
    /// Create a new event.
    CreateEvent,
    /// Approve a pending event.
    ApproveEvent,
    /// Update an existing event.
    UpdateEvent(&'a Event),
    /// Delete an existing event.
    DeleteEvent(&'a Event),
    /// Respond (RSVP) to an event.
    Respond(&'a Event),
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The actor may perform the action.
    Allow,
    /// The actor may not; the reason is suitable for the caller.
    Deny(&'static str),
}

impl Decision {
    /// Whether the decision is [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Which events a role may see when listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventVisibility {
    /// Every event, approved or not.
    All,
    /// Only events whose approval gate is open.
    ApprovedOnly,
}

/// Decide whether `actor` may perform `action`.
#[must_use]
pub fn can(role: Role, actor_id: UserId, action: Action<'_>) -> Decision {
    match action {
        Action::CreateEvent => match role {
            Role::Organizer | Role::Admin => Decision::Allow,
            Role::Attendee => Decision::Deny("Requires ORGANIZER or ADMIN role"),
        },
        Action::ApproveEvent => match role {
            Role::Admin => Decision::Allow,
            Role::Organizer | Role::Attendee => Decision::Deny("Requires ADMIN role"),
        },
        Action::UpdateEvent(event) => owner_or_admin(role, actor_id, event, "update"),
        Action::DeleteEvent(event) => owner_or_admin(role, actor_id, event, "delete"),
        Action::Respond(event) => {
            if event.approval.is_approved() {
                return Decision::Allow;
            }
            // Unapproved events accept responses from admins only.
            // Organizers get no exception for their own events.
            match role {
                Role::Admin => Decision::Allow,
                Role::Organizer | Role::Attendee => Decision::Deny("Event not approved yet"),
            }
        }
    }
}

/// Listing visibility for `role`.
#[must_use]
pub const fn visibility(role: Role) -> EventVisibility {
    match role {
        Role::Admin => EventVisibility::All,
        Role::Organizer | Role::Attendee => EventVisibility::ApprovedOnly,
    }
}

/// Check `can` for an authenticated identity, mapping a denial to an
/// [`crate::error::CoordinationError::Authorization`].
///
/// # Errors
///
/// Returns the denial reason as an authorization error.
pub fn authorize(actor: &Identity, action: Action<'_>) -> crate::error::Result<()> {
    match can(actor.role, actor.user_id, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(crate::error::CoordinationError::forbidden(reason)),
    }
}

fn owner_or_admin(role: Role, actor_id: UserId, event: &Event, verb: &'static str) -> Decision {
    if event.organizer_id == actor_id {
        return Decision::Allow;
    }
    match role {
        Role::Admin => Decision::Allow,
        Role::Organizer | Role::Attendee => Decision::Deny(match verb {
            "update" => "Not authorized to update this event",
            _ => "Not authorized to delete this event",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Approval, EventId};
    use chrono::Utc;

    fn event(organizer: UserId, approval: Approval) -> Event {
        Event {
            id: EventId::new(),
            title: "Meetup".to_string(),
            description: "Monthly meetup".to_string(),
            date: Utc::now(),
            location: "Online".to_string(),
            organizer_id: organizer,
            approval,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_attendee_cannot_create() {
        let actor = UserId::new();
        assert!(!can(Role::Attendee, actor, Action::CreateEvent).is_allowed());
        assert!(can(Role::Organizer, actor, Action::CreateEvent).is_allowed());
        assert!(can(Role::Admin, actor, Action::CreateEvent).is_allowed());
    }

    #[test]
    fn test_only_admin_approves() {
        let actor = UserId::new();
        assert!(can(Role::Admin, actor, Action::ApproveEvent).is_allowed());
        assert!(!can(Role::Organizer, actor, Action::ApproveEvent).is_allowed());
        assert!(!can(Role::Attendee, actor, Action::ApproveEvent).is_allowed());
    }

    #[test]
    fn test_owner_or_admin_mutates() {
        let owner = UserId::new();
        let stranger = UserId::new();
        let ev = event(owner, Approval::Approved);

        assert!(can(Role::Organizer, owner, Action::UpdateEvent(&ev)).is_allowed());
        assert!(can(Role::Admin, stranger, Action::DeleteEvent(&ev)).is_allowed());
        assert!(!can(Role::Organizer, stranger, Action::UpdateEvent(&ev)).is_allowed());
        assert!(!can(Role::Attendee, stranger, Action::DeleteEvent(&ev)).is_allowed());
    }

    #[test]
    fn test_rsvp_gated_on_approval() {
        let owner = UserId::new();
        let responder = UserId::new();
        let pending = event(owner, Approval::Pending);
        let approved = event(owner, Approval::Approved);

        assert!(can(Role::Attendee, responder, Action::Respond(&approved)).is_allowed());
        assert!(!can(Role::Attendee, responder, Action::Respond(&pending)).is_allowed());
        assert!(can(Role::Admin, responder, Action::Respond(&pending)).is_allowed());
        // Organizers get no exception for their own pending events.
        assert!(!can(Role::Organizer, owner, Action::Respond(&pending)).is_allowed());
    }

    #[test]
    fn test_visibility() {
        assert_eq!(visibility(Role::Admin), EventVisibility::All);
        assert_eq!(visibility(Role::Organizer), EventVisibility::ApprovedOnly);
        assert_eq!(visibility(Role::Attendee), EventVisibility::ApprovedOnly);
    }
}
