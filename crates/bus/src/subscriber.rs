//! Event subscriber trait for async event handling

use async_trait::async_trait;

use crate::error::BusError;
use crate::event::ModerationEvent;

/// Trait for event subscribers
///
/// Subscribers run after the store mutation has committed. A returned
/// error is logged by the dispatcher and never propagated back.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Get the subscriber name (for logging)
    fn name(&self) -> &str;

    /// Handle a committed moderation event
    async fn handle(&self, event: &ModerationEvent) -> Result<(), BusError>;
}
