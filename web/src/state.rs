//! Shared application state for Axum handlers.

use gatherly_core::broadcast::BroadcastHub;
use gatherly_core::lifecycle::EventLifecycle;
use gatherly_core::rsvp::RsvpCoordinator;
use gatherly_core::store::RecordStore;
use gatherly_core::verifier::AccessVerifier;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Holds the engine components plus the verifier the extractors use.
/// Everything inside is reference-counted, so cloning per request is
/// cheap.
#[derive(Clone)]
pub struct AppState {
    /// Event lifecycle engine
    pub lifecycle: EventLifecycle,
    /// RSVP coordinator
    pub rsvps: RsvpCoordinator,
    /// Broadcast hub (WebSocket endpoint subscribes here)
    pub hub: Arc<BroadcastHub>,
    /// Bearer credential verifier
    pub verifier: Arc<dyn AccessVerifier>,
}

impl AppState {
    /// Wire the engine components over a store, hub, and verifier.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        hub: Arc<BroadcastHub>,
        verifier: Arc<dyn AccessVerifier>,
    ) -> Self {
        Self {
            lifecycle: EventLifecycle::new(store.clone(), hub.clone()),
            rsvps: RsvpCoordinator::new(store, hub.clone()),
            hub,
            verifier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
