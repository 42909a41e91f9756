//! Integration tests for the roster CLI
//!
//! These run the command layer end to end: config → SQLite store → engine
//! → dispatcher with notifier, role sync and audit journal.

use roster_bus::{AuditJournal, OperationKind};
use roster_cli::{commands, AppContext};
use roster_core::Rank;
use roster_engine::{Actor, RosterConfig};
use tempfile::TempDir;

fn config(dir: &TempDir) -> RosterConfig {
    RosterConfig {
        database_url: format!("sqlite:{}?mode=rwc", dir.path().join("roster.db").display()),
        journal_path: Some(dir.path().join("journal").join("events.jsonl")),
        member_role_id: "ROLE-MEMBER".to_string(),
        ..RosterConfig::default()
    }
}

/// Test: add → warn ×3 → ban-check → list-ban → unban, journal records each mutation
#[tokio::test]
async fn test_moderation_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(config(&temp_dir), Actor::admin("ADMIN-1"))
        .await
        .unwrap();

    let reply = commands::add(&ctx, "A1  B2", None, Some("01/01/2024"), Some(Rank::Sergeant), None)
        .await
        .unwrap();
    assert_eq!(reply, "Added 2 member(s) as sergeant (2 new, 0 already listed)");

    for i in 1..=3 {
        let reply = commands::warn(&ctx, "A1", "afk in war", Some("user-1"), None)
            .await
            .unwrap();
        assert!(reply.starts_with(&format!("Warned A1 ({i}/3)")));
    }

    let status = commands::ban_check(&ctx, "A1").await.unwrap();
    assert!(status.starts_with("A1 is BANNED"));
    let bans = commands::list_bans(&ctx).await.unwrap();
    assert!(bans.starts_with("- A1: reached 3 warnings"));

    let log = commands::warnlog(&ctx, "A1").await.unwrap();
    assert!(log.starts_with("A1: 3/3 warnings"));

    let reply = commands::unban(&ctx, "A1", Some("appeal"), Some("user-1"))
        .await
        .unwrap();
    assert_eq!(reply, "Unbanned A1");
    assert_eq!(commands::ban_check(&ctx, "A1").await.unwrap(), "A1 is not banned");

    let listing = commands::list(&ctx).await.unwrap();
    assert!(listing.contains("[sergeant]\n- A1, joined 01/01/2024\n- B2, joined 01/01/2024"));

    let stats = ctx.shutdown().await.unwrap();
    assert_eq!(stats.failures, 0);

    let journal =
        AuditJournal::open(temp_dir.path().join("journal").join("events.jsonl")).unwrap();
    let kinds: Vec<OperationKind> = journal.read_all().unwrap().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::Add,
            OperationKind::Warn,
            OperationKind::Warn,
            OperationKind::Warn,
            OperationKind::Unban
        ]
    );
}

/// Test: state persists across contexts on the same database
#[tokio::test]
async fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let ctx = AppContext::new(config(&temp_dir), Actor::admin("ADMIN-1"))
        .await
        .unwrap();
    commands::promote(&ctx, Rank::Deputy, "D1", None).await.unwrap();
    commands::ban(&ctx, "X9", "cheating", None, Some("https://img.example/x.png"))
        .await
        .unwrap();
    ctx.shutdown().await.unwrap();

    let ctx = AppContext::new(config(&temp_dir), Actor::moderator("MOD-1"))
        .await
        .unwrap();
    let listing = commands::list(&ctx).await.unwrap();
    assert!(listing.contains("[deputy]\n- D1"));

    let status = commands::ban_check(&ctx, "X9").await.unwrap();
    assert!(status.contains("Evidence: https://img.example/x.png"));

    // Moderators cannot add; banned ids cannot be added by anyone.
    let err = commands::add(&ctx, "N1", None, None, None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not allowed"));
    ctx.shutdown().await.unwrap();

    let ctx = AppContext::new(config(&temp_dir), Actor::admin("ADMIN-1"))
        .await
        .unwrap();
    let err = commands::add(&ctx, "N1 X9", None, None, None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("X9"));
    ctx.shutdown().await.unwrap();
}

/// Test: invalid operator input is rejected before reaching the store
#[tokio::test]
async fn test_input_validation() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = AppContext::new(config(&temp_dir), Actor::admin("ADMIN-1"))
        .await
        .unwrap();

    assert!(commands::add(&ctx, "   ", None, None, None, None).await.is_err());
    assert!(commands::warn(&ctx, "G1", "  ", None, None).await.is_err());
    assert!(commands::promote(&ctx, Rank::Leader, "G1", None).await.is_err());
    assert!(commands::unwarn(&ctx, "G1", 1).await.is_err());

    let log = commands::warnlog(&ctx, "G1").await.unwrap();
    assert_eq!(log, "G1: no warnings on record");
    ctx.shutdown().await.unwrap();
}
