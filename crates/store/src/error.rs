//! Store errors

use thiserror::Error;

/// Errors from a record store backend
///
/// Every variant is treated as transient by the engine: it is surfaced to the
/// caller and never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record for {game_id}: {reason}")]
    Corrupt { game_id: String, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn corrupt(game_id: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::Corrupt {
            game_id: game_id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
