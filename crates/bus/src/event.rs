//! Moderation outcome events
//!
//! One event per committed mutation. Outcomes carry enough to render a log
//! message and to route it to the operation's destination channel.

use chrono::{DateTime, Utc};
use roster_core::{GameId, LinkedIdentity, Rank};
use roster_store::{BanRecord, WarningEntry};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

/// The fixed action set
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum OperationKind {
    Add,
    Remove,
    List,
    BanCheck,
    ListBan,
    Warn,
    Unwarn,
    Warnlog,
    Ban,
    Unban,
    Promote,
    Demote,
}

impl OperationKind {
    /// Read-only operations never publish an event
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            OperationKind::List
                | OperationKind::BanCheck
                | OperationKind::ListBan
                | OperationKind::Warnlog
        )
    }
}

/// Per-id result of an `add`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedMember {
    pub game_id: GameId,
    /// Linked identity as stored (the original one if the member existed)
    pub linked_identity: Option<LinkedIdentity>,
    /// `false` when the member already existed and only the audit entry was appended
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOutcome {
    pub members: Vec<AddedMember>,
    pub rank: Rank,
    pub joined_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// Per-id result of a `remove`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedId {
    pub game_id: GameId,
    pub existed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveOutcome {
    pub ids: Vec<RemovedId>,
    pub effective_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl RemoveOutcome {
    pub fn removed_count(&self) -> usize {
        self.ids.iter().filter(|id| id.existed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarnOutcome {
    pub game_id: GameId,
    pub reason: String,
    /// Ledger length after this warning
    pub count: usize,
    pub threshold: usize,
    pub evidence_ref: Option<String>,
    /// Warned user's linked identity, for a direct message
    pub linked_identity: Option<LinkedIdentity>,
    /// Ban activated by this warning crossing the threshold
    pub escalated: Option<BanRecord>,
}

impl WarnOutcome {
    pub fn is_escalated(&self) -> bool {
        self.escalated.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnwarnOutcome {
    pub game_id: GameId,
    /// 1-based index that was removed
    pub index: usize,
    pub removed: WarningEntry,
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanOutcome {
    pub ban: BanRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbanOutcome {
    pub game_id: GameId,
    pub reason: Option<String>,
    pub linked_identity: Option<LinkedIdentity>,
    /// Ban slot after deactivation; `None` if no ban was active
    pub lifted: Option<BanRecord>,
}

/// Shared by promote and demote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub game_id: GameId,
    pub rank: Rank,
    pub linked_identity: Option<LinkedIdentity>,
    /// The member did not exist and was created with defaults
    pub created: bool,
}

/// Committed outcome, tagged by operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Outcome {
    Added(AddOutcome),
    Removed(RemoveOutcome),
    Warned(WarnOutcome),
    Unwarned(UnwarnOutcome),
    Banned(BanOutcome),
    Unbanned(UnbanOutcome),
    Promoted(RankOutcome),
    Demoted(RankOutcome),
}

impl Outcome {
    pub fn kind(&self) -> OperationKind {
        match self {
            Outcome::Added(_) => OperationKind::Add,
            Outcome::Removed(_) => OperationKind::Remove,
            Outcome::Warned(_) => OperationKind::Warn,
            Outcome::Unwarned(_) => OperationKind::Unwarn,
            Outcome::Banned(_) => OperationKind::Ban,
            Outcome::Unbanned(_) => OperationKind::Unban,
            Outcome::Promoted(_) => OperationKind::Promote,
            Outcome::Demoted(_) => OperationKind::Demote,
        }
    }

    /// Ids touched by the operation
    pub fn affected_ids(&self) -> Vec<&GameId> {
        match self {
            Outcome::Added(o) => o.members.iter().map(|m| &m.game_id).collect(),
            Outcome::Removed(o) => o.ids.iter().map(|r| &r.game_id).collect(),
            Outcome::Warned(o) => vec![&o.game_id],
            Outcome::Unwarned(o) => vec![&o.game_id],
            Outcome::Banned(o) => vec![&o.ban.game_id],
            Outcome::Unbanned(o) => vec![&o.game_id],
            Outcome::Promoted(o) | Outcome::Demoted(o) => vec![&o.game_id],
        }
    }

    /// Membership-role signal implied by this outcome
    ///
    /// Escalating warns and bans revoke; unbans restore. Only emitted when a
    /// linked identity is known.
    pub fn role_signal(&self) -> Option<RoleSignal> {
        match self {
            Outcome::Warned(o) => o
                .escalated
                .as_ref()
                .and(o.linked_identity.clone())
                .map(RoleSignal::Revoke),
            Outcome::Banned(o) => o.ban.linked_identity.clone().map(RoleSignal::Revoke),
            Outcome::Unbanned(o) => o.linked_identity.clone().map(RoleSignal::Restore),
            _ => None,
        }
    }
}

/// Side-effect signal for the membership role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "identity", rename_all = "snake_case")]
pub enum RoleSignal {
    Revoke(LinkedIdentity),
    Restore(LinkedIdentity),
}

impl RoleSignal {
    pub fn identity(&self) -> &LinkedIdentity {
        match self {
            RoleSignal::Revoke(identity) | RoleSignal::Restore(identity) => identity,
        }
    }
}

/// Envelope published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_id: String,
    pub outcome: Outcome,
}

impl ModerationEvent {
    pub fn new(actor_id: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: actor_id.into(),
            outcome,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.outcome.kind()
    }
}
