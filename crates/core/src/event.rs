//! Domain event system — observability without coupling.
//!
//! Memory is deliberately best-effort: a failed retrieval or save never
//! reaches the user. These events are how that silence stays observable.
//! Components publish what happened; subscribers (CLI status line, tests)
//! filter for what they care about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// Records were recalled and injected into a user turn
    MemoryRetrieved {
        namespace: String,
        count: usize,
        timestamp: DateTime<Utc>,
    },

    /// An exchange was appended to the store
    MemorySaved {
        namespace: String,
        timestamp: DateTime<Utc>,
    },

    /// A memory operation was skipped or degraded to a no-op
    MemorySkipped {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// The coordinator delegated to a specialist
    SpecialistInvoked {
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// An agent invocation finished
    InvocationCompleted {
        turns: usize,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub. Publishing
/// with no subscribers is fine.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::MemoryRetrieved {
            namespace: "travel/flights".into(),
            count: 3,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::MemoryRetrieved { namespace, count, .. } => {
                assert_eq!(namespace, "travel/flights");
                assert_eq!(*count, 3);
            }
            _ => panic!("Expected MemoryRetrieved event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::MemorySkipped {
            reason: "no subscribers".into(),
            timestamp: Utc::now(),
        });
    }
}
