//! Broadcast channel carrying committed outcomes

use tokio::sync::broadcast;
use tracing::debug;

use crate::event::ModerationEvent;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 256;

/// Event bus for distributing committed outcomes
///
/// Publishing never blocks and never fails: with no receivers the event is
/// dropped, and a slow receiver lags instead of back-pressuring the engine.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ModerationEvent>,
}

impl EventBus {
    /// Create a new event bus holding up to `capacity` undelivered events
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many receivers will see it
    pub fn publish(&self, event: ModerationEvent) -> usize {
        let kind = event.kind();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(%kind, "no subscribers; event dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ModerationEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
