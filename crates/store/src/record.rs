//! Roster records

use chrono::{DateTime, Utc};
use roster_core::{GameId, LinkedIdentity, Rank};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Kind of administrative action recorded in a member's history
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
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Add,
    Promote,
    Demote,
    Warn,
    Unwarn,
    Ban,
    Unban,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// One entry of a member's append-only history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub action: ActionKind,
    pub actor_id: String,
    /// Free-form action details (rank, note, reason, ...)
    pub details: serde_json::Value,
}

/// Roster member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub game_id: GameId,
    pub linked_identity: Option<LinkedIdentity>,
    pub rank: Rank,
    pub joined_at: DateTime<Utc>,
    pub notes: String,
    pub history: Vec<HistoryEntry>,
}

/// Identity fields written only when a member is first created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMember {
    pub game_id: GameId,
    pub linked_identity: Option<LinkedIdentity>,
    pub rank: Rank,
    pub joined_at: DateTime<Utc>,
    pub notes: String,
}

impl NewMember {
    /// Defaults used when a member is created implicitly (promote/demote)
    pub fn with_defaults(game_id: GameId, joined_at: DateTime<Utc>) -> Self {
        Self {
            game_id,
            linked_identity: None,
            rank: Rank::default(),
            joined_at,
            notes: String::new(),
        }
    }

    pub(crate) fn into_member(self, history: Vec<HistoryEntry>) -> Member {
        Member {
            game_id: self.game_id,
            linked_identity: self.linked_identity,
            rank: self.rank,
            joined_at: self.joined_at,
            notes: self.notes,
            history,
        }
    }
}

/// Result of an upsert: the stored record and whether it was just created
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<T> {
    pub record: T,
    pub created: bool,
}

/// A single warning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningEntry {
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    pub moderator_id: String,
    /// Evidence link (e.g. screenshot URL)
    pub evidence_ref: Option<String>,
}

/// Ordered warnings for one game id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarningLedger {
    pub game_id: GameId,
    pub entries: Vec<WarningEntry>,
}

impl WarningLedger {
    pub fn new(game_id: GameId) -> Self {
        Self {
            game_id,
            entries: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Entry by 1-based index
    pub fn entry(&self, index: usize) -> Option<&WarningEntry> {
        index.checked_sub(1).and_then(|i| self.entries.get(i))
    }
}

/// The single ban slot for a game id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanRecord {
    pub game_id: GameId,
    pub active: bool,
    pub reason: String,
    pub moderator_id: String,
    pub timestamp: DateTime<Utc>,
    pub linked_identity: Option<LinkedIdentity>,
    pub evidence_ref: Option<String>,
}

/// Fields written when a ban is activated (overwrites the previous slot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BanActivation {
    pub reason: String,
    pub moderator_id: String,
    pub timestamp: DateTime<Utc>,
    pub linked_identity: Option<LinkedIdentity>,
    pub evidence_ref: Option<String>,
}

impl BanActivation {
    pub(crate) fn into_record(self, game_id: GameId) -> BanRecord {
        BanRecord {
            game_id,
            active: true,
            reason: self.reason,
            moderator_id: self.moderator_id,
            timestamp: self.timestamp,
            linked_identity: self.linked_identity,
            evidence_ref: self.evidence_ref,
        }
    }
}

/// Escalation rule evaluated inside the warning append
///
/// Fires when the post-append count reaches `threshold` and no ban is active
/// for the id, so a crossing activates exactly one ban.
#[derive(Debug, Clone, PartialEq)]
pub struct Escalation {
    pub threshold: usize,
    pub ban: BanActivation,
}

impl Escalation {
    pub fn fires(&self, count: usize, already_banned: bool) -> bool {
        count >= self.threshold && !already_banned
    }
}

/// Outcome of an atomic warning append
#[derive(Debug, Clone, PartialEq)]
pub struct WarningAppend {
    /// Ledger length after the append
    pub count: usize,
    /// Ban activated by this append, if escalation fired
    pub escalated: Option<BanRecord>,
}

/// Outcome of removing one warning
#[derive(Debug, Clone, PartialEq)]
pub struct WarningRemoval {
    pub entry: WarningEntry,
    /// Ledger length after the removal
    pub remaining: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reason: &str) -> WarningEntry {
        WarningEntry {
            reason: reason.to_string(),
            timestamp: Utc::now(),
            moderator_id: "MOD-1".to_string(),
            evidence_ref: None,
        }
    }

    #[test]
    fn test_action_kind_codes() {
        for kind in [
            ActionKind::Add,
            ActionKind::Promote,
            ActionKind::Demote,
            ActionKind::Warn,
            ActionKind::Unwarn,
            ActionKind::Ban,
            ActionKind::Unban,
        ] {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("kick".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_ledger_one_based_entry() {
        let mut ledger = WarningLedger::new(GameId::new("G1").unwrap());
        ledger.entries.push(entry("first"));
        ledger.entries.push(entry("second"));

        assert!(ledger.entry(0).is_none());
        assert_eq!(ledger.entry(1).unwrap().reason, "first");
        assert_eq!(ledger.entry(2).unwrap().reason, "second");
        assert!(ledger.entry(3).is_none());
        assert_eq!(ledger.count(), 2);
    }

    #[test]
    fn test_escalation_fires_once_per_crossing() {
        let escalation = Escalation {
            threshold: 3,
            ban: BanActivation {
                reason: "threshold reached".to_string(),
                moderator_id: "MOD-1".to_string(),
                timestamp: Utc::now(),
                linked_identity: None,
                evidence_ref: None,
            },
        };

        assert!(!escalation.fires(2, false));
        assert!(escalation.fires(3, false));
        assert!(!escalation.fires(4, true));
        // A lifted ban with the ledger still over the threshold re-arms.
        assert!(escalation.fires(4, false));
    }
}
