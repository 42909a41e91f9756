//! Typed operation inputs
//!
//! Identifiers arrive already parsed; free text is normalised here (blank
//! notes and evidence become `None`).

use roster_core::{GameId, LinkedIdentity, Rank};

use crate::error::{EngineError, EngineResult};

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn required(field: &str, text: String) -> EngineResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub ids: Vec<GameId>,
    pub linked_identity: Option<LinkedIdentity>,
    /// `DD/MM/YYYY`; absent or unparseable means now
    pub day: Option<String>,
    pub rank: Option<Rank>,
    pub note: Option<String>,
}

impl AddRequest {
    pub fn new(ids: Vec<GameId>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    pub fn linked_identity(mut self, identity: LinkedIdentity) -> Self {
        self.linked_identity = Some(identity);
        self
    }

    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    pub fn rank(mut self, rank: Rank) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn normalized_note(&self) -> Option<String> {
        non_blank(self.note.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RemoveRequest {
    pub ids: Vec<GameId>,
    pub day: Option<String>,
    pub note: Option<String>,
}

impl RemoveRequest {
    pub fn new(ids: Vec<GameId>) -> Self {
        Self {
            ids,
            ..Default::default()
        }
    }

    pub fn day(mut self, day: impl Into<String>) -> Self {
        self.day = Some(day.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn normalized_note(&self) -> Option<String> {
        non_blank(self.note.clone())
    }
}

#[derive(Debug, Clone)]
pub struct WarnRequest {
    pub game_id: GameId,
    pub reason: String,
    /// Warned user, for the direct message and role revocation on escalation
    pub linked_identity: Option<LinkedIdentity>,
    pub evidence_ref: Option<String>,
}

impl WarnRequest {
    pub fn new(game_id: GameId, reason: impl Into<String>) -> Self {
        Self {
            game_id,
            reason: reason.into(),
            linked_identity: None,
            evidence_ref: None,
        }
    }

    pub fn linked_identity(mut self, identity: LinkedIdentity) -> Self {
        self.linked_identity = Some(identity);
        self
    }

    pub fn evidence(mut self, evidence_ref: impl Into<String>) -> Self {
        self.evidence_ref = Some(evidence_ref.into());
        self
    }

    pub(crate) fn validated(self) -> EngineResult<Self> {
        Ok(Self {
            reason: required("reason", self.reason)?,
            evidence_ref: non_blank(self.evidence_ref),
            ..self
        })
    }
}

#[derive(Debug, Clone)]
pub struct BanRequest {
    pub game_id: GameId,
    pub reason: String,
    pub linked_identity: Option<LinkedIdentity>,
    pub evidence_ref: Option<String>,
}

impl BanRequest {
    pub fn new(game_id: GameId, reason: impl Into<String>) -> Self {
        Self {
            game_id,
            reason: reason.into(),
            linked_identity: None,
            evidence_ref: None,
        }
    }

    pub fn linked_identity(mut self, identity: LinkedIdentity) -> Self {
        self.linked_identity = Some(identity);
        self
    }

    pub fn evidence(mut self, evidence_ref: impl Into<String>) -> Self {
        self.evidence_ref = Some(evidence_ref.into());
        self
    }

    pub(crate) fn validated(self) -> EngineResult<Self> {
        Ok(Self {
            reason: required("reason", self.reason)?,
            evidence_ref: non_blank(self.evidence_ref),
            ..self
        })
    }
}

#[derive(Debug, Clone)]
pub struct UnbanRequest {
    pub game_id: GameId,
    pub reason: Option<String>,
    pub linked_identity: Option<LinkedIdentity>,
}

impl UnbanRequest {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            reason: None,
            linked_identity: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn linked_identity(mut self, identity: LinkedIdentity) -> Self {
        self.linked_identity = Some(identity);
        self
    }

    pub(crate) fn normalized_reason(&self) -> Option<String> {
        non_blank(self.reason.clone())
    }
}

/// Input to promote and demote
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub game_id: GameId,
    pub rank: Rank,
    /// Stored only if the member is created by this request
    pub linked_identity: Option<LinkedIdentity>,
}

impl RankRequest {
    pub fn new(game_id: GameId, rank: Rank) -> Self {
        Self {
            game_id,
            rank,
            linked_identity: None,
        }
    }

    pub fn linked_identity(mut self, identity: LinkedIdentity) -> Self {
        self.linked_identity = Some(identity);
        self
    }
}
