//! Integration tests for the SQLite record store
//!
//! These run against a real database file so that concurrent writers go
//! through separate pooled connections.

use std::sync::Arc;

use chrono::{Duration, Utc};
use roster_core::{GameId, LinkedIdentity, Rank};
use roster_store::{
    ActionKind, BanActivation, Escalation, HistoryEntry, NewMember, RecordStore, SqliteStore,
    WarningEntry,
};
use tempfile::TempDir;

fn gid(s: &str) -> GameId {
    GameId::new(s).unwrap()
}

fn audit(action: ActionKind) -> HistoryEntry {
    HistoryEntry {
        timestamp: Utc::now(),
        action,
        actor_id: "ADMIN-1".to_string(),
        details: serde_json::json!({ "note": "test" }),
    }
}

fn warning(reason: &str) -> WarningEntry {
    WarningEntry {
        reason: reason.to_string(),
        timestamp: Utc::now(),
        moderator_id: "MOD-1".to_string(),
        evidence_ref: Some("https://img.example/1.png".to_string()),
    }
}

fn escalation() -> Escalation {
    Escalation {
        threshold: 3,
        ban: BanActivation {
            reason: "threshold reached".to_string(),
            moderator_id: "MOD-1".to_string(),
            timestamp: Utc::now(),
            linked_identity: None,
            evidence_ref: None,
        },
    }
}

async fn open(dir: &TempDir) -> SqliteStore {
    SqliteStore::open(dir.path().join("roster.db")).await.unwrap()
}

/// Test: member survives reopen with identity and history intact
#[tokio::test]
async fn test_member_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let store = open(&temp_dir).await;
        let mut member = NewMember::with_defaults(gid("Kaito_77"), Utc::now());
        member.linked_identity = Some(LinkedIdentity::new("user-42").unwrap());
        member.rank = Rank::Sergeant;
        member.notes = "recruited at event".to_string();

        let out = store
            .insert_member_if_absent(member, audit(ActionKind::Add))
            .await
            .unwrap();
        assert!(out.created);
        store.close().await;
    }

    let store = open(&temp_dir).await;
    let member = store.get_member(&gid("Kaito_77")).await.unwrap().unwrap();
    assert_eq!(member.rank, Rank::Sergeant);
    assert_eq!(member.notes, "recruited at event");
    assert_eq!(member.linked_identity.unwrap().as_str(), "user-42");
    assert_eq!(member.history.len(), 1);
    assert_eq!(member.history[0].action, ActionKind::Add);
    assert_eq!(member.history[0].details["note"], "test");

    // Case-preserving key
    assert!(store.get_member(&gid("kaito_77")).await.unwrap().is_none());
}

/// Test: set_member_rank only overwrites rank on an existing member
#[tokio::test]
async fn test_set_rank_keeps_identity_fields() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir).await;

    let mut member = NewMember::with_defaults(gid("A1"), Utc::now() - Duration::days(3));
    member.notes = "veteran".to_string();
    store
        .insert_member_if_absent(member, audit(ActionKind::Add))
        .await
        .unwrap();

    let mut promote = NewMember::with_defaults(gid("A1"), Utc::now());
    promote.rank = Rank::Deputy;
    promote.linked_identity = Some(LinkedIdentity::new("someone-else").unwrap());
    let out = store
        .set_member_rank(promote, audit(ActionKind::Promote))
        .await
        .unwrap();

    assert!(!out.created);
    assert_eq!(out.record.rank, Rank::Deputy);
    assert_eq!(out.record.notes, "veteran");
    assert!(out.record.linked_identity.is_none());
    assert_eq!(out.record.history.len(), 2);

    let mut fresh = NewMember::with_defaults(gid("B2"), Utc::now());
    fresh.rank = Rank::Member;
    let created = store
        .set_member_rank(fresh, audit(ActionKind::Demote))
        .await
        .unwrap();
    assert!(created.created);
    assert_eq!(created.record.rank, Rank::Member);
}

/// Test: list_members orders by joined_at and delete reports which existed
#[tokio::test]
async fn test_list_and_delete_members() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir).await;
    let now = Utc::now();

    for (id, age) in [("NEW", 0), ("OLD", 30), ("MID", 10)] {
        store
            .insert_member_if_absent(
                NewMember::with_defaults(gid(id), now - Duration::days(age)),
                audit(ActionKind::Add),
            )
            .await
            .unwrap();
    }

    let ids: Vec<String> = store
        .list_members()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.game_id.into_inner())
        .collect();
    assert_eq!(ids, vec!["OLD", "MID", "NEW"]);

    let existed = store
        .delete_members(&[gid("MID"), gid("GHOST")])
        .await
        .unwrap();
    assert_eq!(existed, vec![gid("MID")]);
    assert_eq!(store.list_members().await.unwrap().len(), 2);

    // History of a deleted member is gone; append refuses absent members.
    assert!(!store
        .append_history(&gid("MID"), audit(ActionKind::Warn))
        .await
        .unwrap());
}

/// Test: warnings append in order, unwarn removes by 1-based index
#[tokio::test]
async fn test_warning_ledger_ordering() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir).await;
    let g = gid("G1");

    assert!(store.get_warnings(&g).await.unwrap().is_none());

    for reason in ["afk", "spam"] {
        store
            .append_warning(&g, warning(reason), escalation())
            .await
            .unwrap();
    }

    assert!(store.remove_warning(&g, usize::MAX).await.unwrap().is_none());
    assert!(store.remove_warning(&g, 0).await.unwrap().is_none());
    assert_eq!(store.get_warnings(&g).await.unwrap().unwrap().count(), 2);

    let removed = store.remove_warning(&g, 1).await.unwrap().unwrap();
    assert_eq!(removed.entry.reason, "afk");
    assert_eq!(removed.remaining, 1);
    assert!(store.remove_warning(&g, 2).await.unwrap().is_none());

    let ledger = store.get_warnings(&g).await.unwrap().unwrap();
    assert_eq!(ledger.count(), 1);
    assert_eq!(ledger.entry(1).unwrap().reason, "spam");
    assert_eq!(
        ledger.entry(1).unwrap().evidence_ref.as_deref(),
        Some("https://img.example/1.png")
    );

    // Emptied ledgers still exist.
    store.remove_warning(&g, 1).await.unwrap();
    assert_eq!(store.get_warnings(&g).await.unwrap().unwrap().count(), 0);
}

/// Test: concurrent warns that cross the threshold activate exactly one ban
#[tokio::test]
async fn test_concurrent_warns_escalate_once() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(open(&temp_dir).await);
    let g = gid("RACE");

    store
        .append_warning(&g, warning("first"), escalation())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for i in 0..6 {
        let store = Arc::clone(&store);
        let g = g.clone();
        handles.push(tokio::spawn(async move {
            store
                .append_warning(&g, warning(&format!("burst {i}")), escalation())
                .await
                .unwrap()
        }));
    }

    let mut escalations = 0;
    let mut counts = Vec::new();
    for handle in handles {
        let out = handle.await.unwrap();
        counts.push(out.count);
        if out.escalated.is_some() {
            escalations += 1;
        }
    }

    counts.sort_unstable();
    assert_eq!(counts, vec![2, 3, 4, 5, 6, 7]);
    assert_eq!(escalations, 1);
    assert_eq!(store.get_warnings(&g).await.unwrap().unwrap().count(), 7);
    assert!(store.get_ban(&g).await.unwrap().unwrap().active);
}

/// Test: ban slot is single, reactivation overwrites, deactivation keeps the record
#[tokio::test]
async fn test_ban_slot_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let store = open(&temp_dir).await;
    let g = gid("B1");
    let now = Utc::now();

    let first = store
        .activate_ban(
            &g,
            BanActivation {
                reason: "cheating".to_string(),
                moderator_id: "MOD-1".to_string(),
                timestamp: now - Duration::hours(1),
                linked_identity: Some(LinkedIdentity::new("user-9").unwrap()),
                evidence_ref: None,
            },
        )
        .await
        .unwrap();
    assert!(first.active);

    let lifted = store.deactivate_ban(&g).await.unwrap().unwrap();
    assert!(!lifted.active);
    assert_eq!(lifted.reason, "cheating");
    assert!(store.deactivate_ban(&g).await.unwrap().is_none());
    assert!(store.list_active_bans().await.unwrap().is_empty());

    store
        .activate_ban(
            &g,
            BanActivation {
                reason: "toxicity".to_string(),
                moderator_id: "MOD-2".to_string(),
                timestamp: now,
                linked_identity: None,
                evidence_ref: Some("https://img.example/2.png".to_string()),
            },
        )
        .await
        .unwrap();

    let ban = store.get_ban(&g).await.unwrap().unwrap();
    assert!(ban.active);
    assert_eq!(ban.reason, "toxicity");
    assert_eq!(ban.moderator_id, "MOD-2");
    assert!(ban.linked_identity.is_none());
    assert_eq!(ban.timestamp.timestamp_micros(), now.timestamp_micros());
}

/// Test: active_bans_among filters inactive and unknown ids
#[tokio::test]
async fn test_active_bans_among() {
    let store = SqliteStore::in_memory().await.unwrap();
    let now = Utc::now();

    for id in ["X1", "X2", "X3"] {
        store
            .activate_ban(
                &gid(id),
                BanActivation {
                    reason: "raid".to_string(),
                    moderator_id: "MOD-1".to_string(),
                    timestamp: now,
                    linked_identity: None,
                    evidence_ref: None,
                },
            )
            .await
            .unwrap();
    }
    store.deactivate_ban(&gid("X2")).await.unwrap();

    let bans = store
        .active_bans_among(&[gid("X1"), gid("X2"), gid("X3"), gid("NOPE")])
        .await
        .unwrap();
    let ids: Vec<&str> = bans.iter().map(|b| b.game_id.as_str()).collect();
    assert_eq!(ids, vec!["X1", "X3"]);

    assert!(store.active_bans_among(&[]).await.unwrap().is_empty());
}
