//! Domain model for the coordination engine.
//!
//! Records mirror the wire shapes clients already consume: camelCase
//! field names, SCREAMING_SNAKE_CASE role/status discriminants, and an
//! `approved` boolean backed internally by the two-state [`Approval`]
//! enum so de-approval is unrepresentable.

mod event;
mod rsvp;
mod user;

pub use event::{Approval, Event, EventDetails, EventDraft, EventId, EventPatch, EventRef};
pub use rsvp::{
    ResponderInfo, ResponderRef, Rsvp, RsvpDetails, RsvpStatus, RsvpWithRefs, RsvpWithResponder,
};
pub use user::{NewUser, OrganizerRef, Role, User, UserId};
