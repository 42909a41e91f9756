//! Roster Event Bus - in-process async distribution of moderation outcomes
//!
//! The engine publishes one [`ModerationEvent`] per committed mutation.
//! Subscribers (role sync, notifier, audit journal) consume them on a
//! dispatcher task; their failures are logged and never reach the engine.
//!
//! - Async pub/sub with a tokio broadcast channel
//! - [`EventSubscriber`] trait for delivery-side handlers
//! - Routing of each operation kind to a configured log channel

pub mod channel;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod journal;
pub mod notifier;
pub mod role;
pub mod routing;
pub mod subscriber;

pub use channel::EventBus;
pub use dispatch::{DispatchStats, Dispatcher};
pub use error::{BusError, BusResult};
pub use event::{
    AddOutcome, AddedMember, BanOutcome, ModerationEvent, OperationKind, Outcome, RankOutcome,
    RemoveOutcome, RemovedId, RoleSignal, UnbanOutcome, UnwarnOutcome, WarnOutcome,
};
pub use journal::AuditJournal;
pub use notifier::TracingNotifier;
pub use role::{LoggingRoleSync, RoleSync, RoleSyncSubscriber};
pub use routing::LogChannels;
pub use subscriber::EventSubscriber;
