//! Member history entries written alongside each mutation

use chrono::{DateTime, Utc};
use roster_core::Rank;
use roster_store::{ActionKind, HistoryEntry};
use serde_json::{json, Value};

use crate::actor::Actor;

pub fn entry(action: ActionKind, actor: &Actor, at: DateTime<Utc>, details: Value) -> HistoryEntry {
    HistoryEntry {
        timestamp: at,
        action,
        actor_id: actor.id.clone(),
        details,
    }
}

pub fn add(actor: &Actor, at: DateTime<Utc>, rank: Rank, note: Option<&str>) -> HistoryEntry {
    entry(
        ActionKind::Add,
        actor,
        at,
        json!({ "rank": rank, "note": note.unwrap_or_default() }),
    )
}

pub fn rank_change(action: ActionKind, actor: &Actor, at: DateTime<Utc>, rank: Rank) -> HistoryEntry {
    entry(action, actor, at, json!({ "rank": rank }))
}

pub fn warn(
    actor: &Actor,
    at: DateTime<Utc>,
    reason: &str,
    count: usize,
    escalated: bool,
) -> HistoryEntry {
    entry(
        ActionKind::Warn,
        actor,
        at,
        json!({ "reason": reason, "count": count, "escalated": escalated }),
    )
}

pub fn unwarn(actor: &Actor, at: DateTime<Utc>, index: usize, reason: &str) -> HistoryEntry {
    entry(
        ActionKind::Unwarn,
        actor,
        at,
        json!({ "index": index, "reason": reason }),
    )
}

pub fn ban(actor: &Actor, at: DateTime<Utc>, reason: &str, evidence_ref: Option<&str>) -> HistoryEntry {
    entry(
        ActionKind::Ban,
        actor,
        at,
        json!({ "reason": reason, "evidence_ref": evidence_ref }),
    )
}

pub fn unban(actor: &Actor, at: DateTime<Utc>, reason: Option<&str>) -> HistoryEntry {
    entry(ActionKind::Unban, actor, at, json!({ "reason": reason }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_details() {
        let e = add(&Actor::admin("ADMIN-1"), Utc::now(), Rank::Sergeant, None);
        assert_eq!(e.action, ActionKind::Add);
        assert_eq!(e.actor_id, "ADMIN-1");
        assert_eq!(e.details["rank"], "sergeant");
        assert_eq!(e.details["note"], "");
    }

    #[test]
    fn test_warn_details() {
        let e = warn(&Actor::moderator("MOD-1"), Utc::now(), "spam", 3, true);
        assert_eq!(e.details["count"], 3);
        assert_eq!(e.details["escalated"], true);
    }
}
