//! Integration tests for event dispatch
//!
//! Publish → dispatcher → subscribers, including failing subscribers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use roster_bus::{
    AuditJournal, BusError, Dispatcher, EventBus, EventSubscriber, ModerationEvent, Outcome,
    RankOutcome, UnbanOutcome,
};
use roster_core::{GameId, LinkedIdentity, Rank};
use tempfile::TempDir;

struct Failing;

#[async_trait]
impl EventSubscriber for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    async fn handle(&self, _event: &ModerationEvent) -> Result<(), BusError> {
        Err(BusError::SubscriberFailed {
            name: "failing".to_string(),
            reason: "platform unreachable".to_string(),
        })
    }
}

#[derive(Default)]
struct Counting {
    seen: AtomicUsize,
}

#[async_trait]
impl EventSubscriber for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    async fn handle(&self, _event: &ModerationEvent) -> Result<(), BusError> {
        self.seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn promoted(id: &str) -> ModerationEvent {
    ModerationEvent::new(
        "ADMIN-1",
        Outcome::Promoted(RankOutcome {
            game_id: GameId::new(id).unwrap(),
            rank: Rank::Sergeant,
            linked_identity: None,
            created: false,
        }),
    )
}

/// Test: a failing subscriber does not prevent delivery to the others
#[tokio::test]
async fn test_failure_is_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let journal = Arc::new(AuditJournal::open(temp_dir.path().join("journal.jsonl")).unwrap());
    let counting = Arc::new(Counting::default());

    let bus = EventBus::new(16);
    let dispatcher = Dispatcher::new(&bus)
        .with_subscriber(Arc::new(Failing))
        .with_subscriber(counting.clone())
        .with_subscriber(journal.clone());
    assert_eq!(
        dispatcher.subscriber_names(),
        vec!["failing", "counting", "audit-journal"]
    );
    let handle = dispatcher.spawn();

    bus.publish(promoted("A1"));
    bus.publish(ModerationEvent::new(
        "MOD-1",
        Outcome::Unbanned(UnbanOutcome {
            game_id: GameId::new("B2").unwrap(),
            reason: Some("appeal accepted".to_string()),
            linked_identity: Some(LinkedIdentity::new("user-2").unwrap()),
            lifted: None,
        }),
    ));
    drop(bus);

    let stats = handle.await.unwrap();
    assert_eq!(stats.failures, 2);
    assert_eq!(stats.delivered, 4);
    assert_eq!(counting.seen.load(Ordering::SeqCst), 2);

    let events = journal.read_all().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].timestamp <= Utc::now());
    assert!(matches!(events[1].outcome, Outcome::Unbanned(_)));
}

/// Test: events published before the dispatcher subscribes are not replayed
#[tokio::test]
async fn test_late_dispatcher_misses_earlier_events() {
    let bus = EventBus::new(4);
    assert_eq!(bus.publish(promoted("EARLY")), 0);

    let counting = Arc::new(Counting::default());
    let handle = Dispatcher::new(&bus)
        .with_subscriber(counting.clone())
        .spawn();

    bus.publish(promoted("LATE"));
    drop(bus);

    let stats = handle.await.unwrap();
    assert_eq!(stats.delivered, 1);
    assert_eq!(counting.seen.load(Ordering::SeqCst), 1);
}
