//! Calling moderator

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Who is performing an operation
///
/// `can_administer` is the result of the caller's single capability check;
/// the engine does not resolve roles itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub can_administer: bool,
}

impl Actor {
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            can_administer: true,
        }
    }

    pub fn moderator(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            can_administer: false,
        }
    }

    pub fn require_admin(&self) -> EngineResult<()> {
        if self.can_administer {
            Ok(())
        } else {
            Err(EngineError::Forbidden {
                actor: self.id.clone(),
            })
        }
    }
}
