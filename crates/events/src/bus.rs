//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish a [`BusEvent`] and return immediately; the
//! [`NotificationRouter`](crate::router::NotificationRouter) consumes it.

use chrono::{DateTime, Utc};
use haven_core::notify::NotificationEvent;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// BusEvent
// ---------------------------------------------------------------------------

/// A notification event stamped with the time it was published.
#[derive(Debug, Clone, Serialize)]
pub struct BusEvent {
    pub event: NotificationEvent,
    pub timestamp: DateTime<Utc>,
}

impl BusEvent {
    pub fn new(event: NotificationEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
///
/// ```rust
/// use haven_core::notify::NotificationEvent;
/// use haven_events::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(NotificationEvent::follow(1, 2));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<BusEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed events are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: NotificationEvent) {
        tracing::debug!(kind = event.kind(), sender_id = event.sender_id(), "Event published");
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(BusEvent::new(event));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
