//! Event bus between the background adapters and the board runtime.
//!
//! Uses tokio::sync::broadcast for pub/sub. Adapters publish what they learned
//! from upstream; the board runtime is the main subscriber.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::board::model::Snapshot;
use crate::board::tickers::WeatherReading;

/// Event types that can be published on the bus
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// A fetch returned content whose hash differs from the last one
    SnapshotChanged {
        snapshot: Arc<Snapshot>,
        hash: String,
    },
    /// A fetch returned byte-identical content
    SnapshotUnchanged { hash: String },
    /// No key stored, or upstream rejected it
    AccessRequired,
    /// A key was stored through the setup flow
    AccessProvisioned,
    /// Transient fetch failure; the last snapshot stays on screen
    FetchFailed { error: String },
    WeatherUpdated { reading: WeatherReading },
}

impl BusEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SnapshotChanged { .. } => "snapshot_changed",
            Self::SnapshotUnchanged { .. } => "snapshot_unchanged",
            Self::AccessRequired => "access_required",
            Self::AccessProvisioned => "access_provisioned",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::WeatherUpdated { .. } => "weather_updated",
        }
    }
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: BusEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pubsub() {
        let bus = create_bus();
        let mut rx = bus.subscribe();

        bus.publish(BusEvent::SnapshotUnchanged {
            hash: "abc".to_string(),
        });

        match rx.recv().await.unwrap() {
            BusEvent::SnapshotUnchanged { hash } => assert_eq!(hash, "abc"),
            other => panic!("Wrong event type: {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = create_bus();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(BusEvent::AccessRequired);

        assert!(matches!(rx1.recv().await.unwrap(), BusEvent::AccessRequired));
        assert!(matches!(rx2.recv().await.unwrap(), BusEvent::AccessRequired));
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = create_bus();
        bus.publish(BusEvent::AccessProvisioned);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
