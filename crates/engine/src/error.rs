//! Engine errors

use roster_core::{GameId, IdentityError, RankError};
use roster_store::StoreError;
use thiserror::Error;

/// Errors returned by [`ModerationEngine`](crate::ModerationEngine) operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{actor} is not allowed to perform administrative actions")]
    Forbidden { actor: String },

    #[error("Banned ids cannot be added: {}", join_ids(.banned))]
    Conflict { banned: Vec<GameId> },

    #[error("Not found: {0}")]
    NotFound(String),

    /// Transient persistence failure, surfaced as-is and never retried
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl From<IdentityError> for EngineError {
    fn from(e: IdentityError) -> Self {
        EngineError::Validation(e.to_string())
    }
}

impl From<RankError> for EngineError {
    fn from(e: RankError) -> Self {
        EngineError::Validation(e.to_string())
    }
}

fn join_ids(ids: &[GameId]) -> String {
    ids.iter()
        .map(GameId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::Rank;

    #[test]
    fn test_conflict_lists_banned_ids() {
        let err = EngineError::Conflict {
            banned: vec![GameId::new("X").unwrap(), GameId::new("Z").unwrap()],
        };
        assert_eq!(err.to_string(), "Banned ids cannot be added: X, Z");
    }

    #[test]
    fn test_rank_error_is_validation() {
        let err: EngineError = RankError::NotPromotable(Rank::Leader).into();
        assert!(matches!(err, EngineError::Validation(_)));
    }
}
