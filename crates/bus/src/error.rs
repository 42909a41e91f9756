//! Event bus errors

use thiserror::Error;

/// Errors that can occur on the delivery side of the bus
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Subscriber '{name}' failed: {reason}")]
    SubscriberFailed { name: String, reason: String },

    #[error("Role sync failed for {identity}: {reason}")]
    RoleSyncFailed { identity: String, reason: String },

    #[error("Journal IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Journal unavailable: {0}")]
    JournalUnavailable(String),
}

pub type BusResult<T> = Result<T, BusError>;
