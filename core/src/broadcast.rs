//! Broadcast hub: live fan-out of change notifications.
//!
//! The hub is an explicit registry object handed to the lifecycle and
//! RSVP components (never a module-level singleton), so tests can
//! instantiate isolated hubs. Each successful mutation publishes one
//! [`Envelope`]; the hub serializes it once and sends it to every
//! registered sink. Delivery is best-effort and at-most-once: a closed
//! sink is silently pruned, nothing is queued for disconnected clients,
//! and a sink failure never surfaces to the mutating caller.

use crate::model::{EventDetails, EventId, RsvpWithRefs};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use tracing::{debug, error, trace};

/// A change produced by a successful mutation.
///
/// Serialized with a `type` discriminator matching the names clients
/// dispatch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum Change {
    /// A new event exists (possibly still pending approval).
    EventCreated {
        /// The created event with projections
        event: EventDetails,
    },
    /// An event passed the approval gate.
    EventApproved {
        /// The approved event with projections
        event: EventDetails,
    },
    /// An event's content fields changed.
    EventUpdated {
        /// The updated event with projections
        event: EventDetails,
    },
    /// An event was deleted. Carries the former id and title so clients
    /// can display the removal after the record is gone.
    EventDeleted {
        /// Former event id
        event_id: EventId,
        /// Former event title
        event_title: String,
    },
    /// An RSVP was created or overwritten.
    RsvpUpdated {
        /// The resulting response with projections
        rsvp: RsvpWithRefs,
        /// Target event id
        event_id: EventId,
    },
}

/// The message every subscriber receives: a change plus the moment it
/// was published, as an RFC 3339 timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// The change
    #[serde(flatten)]
    pub change: Change,
    /// Publication time
    pub timestamp: DateTime<Utc>,
}

/// Registry of live subscribers.
pub struct BroadcastHub {
    next_id: AtomicU64,
    sinks: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
}

impl BroadcastHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            sinks: Mutex::new(HashMap::new()),
        }
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock_sinks().len()
    }

    /// Register a new subscriber.
    ///
    /// The returned [`Subscription`] yields serialized envelopes for
    /// every mutation published after this call; dropping it
    /// deregisters the sink.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_sinks().insert(id, tx);
        debug!(subscriber = id, "Subscriber registered");
        Subscription {
            id,
            hub: Arc::downgrade(self),
            receiver: rx,
        }
    }

    /// Publish `change` to every registered subscriber.
    ///
    /// Iterates over a snapshot of the registry, so subscribers may be
    /// added or removed concurrently without affecting the broadcast in
    /// flight. Sinks whose receiving side is gone are pruned.
    pub fn publish(&self, change: Change) {
        let envelope = Envelope {
            change,
            timestamp: Utc::now(),
        };
        let message = match serde_json::to_string(&envelope) {
            Ok(json) => json,
            Err(e) => {
                // Envelopes are plain data; this indicates a bug, not a
                // subscriber problem.
                error!(error = %e, "Failed to serialize broadcast envelope");
                return;
            }
        };

        let snapshot: Vec<(u64, mpsc::UnboundedSender<String>)> = self
            .lock_sinks()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut closed = Vec::new();
        for (id, tx) in &snapshot {
            if tx.send(message.clone()).is_err() {
                closed.push(*id);
            }
        }
        trace!(
            subscribers = snapshot.len(),
            dropped = closed.len(),
            "Broadcast fanned out"
        );

        if !closed.is_empty() {
            let mut sinks = self.lock_sinks();
            for id in closed {
                sinks.remove(&id);
                debug!(subscriber = id, "Closed sink pruned");
            }
        }
    }

    fn deregister(&self, id: u64) {
        if self.lock_sinks().remove(&id).is_some() {
            debug!(subscriber = id, "Subscriber deregistered");
        }
    }

    fn lock_sinks(&self) -> MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<String>>> {
        // A poisoned registry only means another thread panicked while
        // holding the lock; the map itself is still usable.
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}

/// A live subscription to hub broadcasts.
///
/// Dropping it removes the sink from the registry.
pub struct Subscription {
    id: u64,
    hub: Weak<BroadcastHub>,
    receiver: mpsc::UnboundedReceiver<String>,
}

impl Subscription {
    /// Receive the next serialized envelope, or `None` once the hub is
    /// gone and the backlog is drained.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Non-blocking receive for callers that poll.
    ///
    /// # Errors
    ///
    /// Returns the underlying channel error when empty or disconnected.
    pub fn try_recv(&mut self) -> Result<String, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.deregister(self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Rsvp, RsvpStatus, UserId};

    #[test]
    fn test_deleted_envelope_wire_shape() {
        let envelope = Envelope {
            change: Change::EventDeleted {
                event_id: EventId::new(),
                event_title: "Launch".to_string(),
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["type"], "EVENT_DELETED");
        assert_eq!(json["eventTitle"], "Launch");
        assert!(json.get("eventId").is_some());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_rsvp_envelope_wire_shape() {
        let event_id = EventId::new();
        let envelope = Envelope {
            change: Change::RsvpUpdated {
                rsvp: RsvpWithRefs {
                    rsvp: Rsvp {
                        user_id: UserId::new(),
                        event_id,
                        status: RsvpStatus::Maybe,
                        created_at: Utc::now(),
                    },
                    user: crate::model::ResponderRef {
                        email: "a@example.com".to_string(),
                    },
                    event: crate::model::EventRef {
                        id: event_id,
                        title: "Launch".to_string(),
                    },
                },
                event_id,
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["type"], "RSVP_UPDATED");
        assert_eq!(json["rsvp"]["status"], "MAYBE");
        assert_eq!(json["rsvp"]["user"]["email"], "a@example.com");
        assert_eq!(json["eventId"], json["rsvp"]["eventId"]);
    }
}
