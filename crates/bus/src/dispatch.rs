//! Dispatcher task fanning bus events out to subscribers

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::channel::EventBus;
use crate::event::ModerationEvent;
use crate::subscriber::EventSubscriber;

/// Delivers each event to every registered subscriber, in order
pub struct Dispatcher {
    receiver: Receiver<ModerationEvent>,
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

/// Counters returned when the dispatcher stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub failures: u64,
    pub lagged: u64,
}

impl Dispatcher {
    /// Subscribe to `bus`; events published before this call are not seen
    pub fn new(bus: &EventBus) -> Self {
        Self {
            receiver: bus.subscribe(),
            subscribers: Vec::new(),
        }
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    pub fn subscriber_names(&self) -> Vec<&str> {
        self.subscribers.iter().map(|s| s.name()).collect()
    }

    /// Run until every bus handle is dropped and the backlog is drained
    pub async fn run(mut self) -> DispatchStats {
        let mut stats = DispatchStats::default();

        loop {
            match self.receiver.recv().await {
                Ok(event) => self.deliver(&event, &mut stats).await,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "dispatcher lagged; events skipped");
                    stats.lagged += skipped;
                }
                Err(RecvError::Closed) => break,
            }
        }

        debug!(?stats, "dispatcher stopped");
        stats
    }

    pub fn spawn(self) -> JoinHandle<DispatchStats> {
        tokio::spawn(self.run())
    }

    async fn deliver(&self, event: &ModerationEvent, stats: &mut DispatchStats) {
        for subscriber in &self.subscribers {
            match subscriber.handle(event).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    stats.failures += 1;
                    warn!(
                        subscriber = subscriber.name(),
                        event_id = %event.id,
                        kind = %event.kind(),
                        error = %e,
                        "subscriber failed"
                    );
                }
            }
        }
    }
}
