//! Application context - wires everything together

use std::sync::Arc;

use roster_bus::{
    AuditJournal, DispatchStats, Dispatcher, EventBus, LoggingRoleSync, RoleSyncSubscriber,
    TracingNotifier,
};
use roster_engine::{Actor, ModerationEngine, RosterConfig};
use roster_store::SqliteStore;
use tokio::task::JoinHandle;
use tracing::debug;

/// Application context - engine plus its delivery-side dispatcher
pub struct AppContext {
    pub engine: ModerationEngine<SqliteStore>,
    pub actor: Actor,
    dispatcher: JoinHandle<DispatchStats>,
}

impl AppContext {
    /// Open the store named in `config` and start the dispatcher
    pub async fn new(config: RosterConfig, actor: Actor) -> Result<Self, anyhow::Error> {
        let store = SqliteStore::connect(&config.database_url).await?;
        let bus = EventBus::new(config.event_buffer);

        let mut dispatcher = Dispatcher::new(&bus)
            .with_subscriber(Arc::new(TracingNotifier::new(config.log_channels.clone())))
            .with_subscriber(Arc::new(RoleSyncSubscriber::new(
                config.member_role_id.clone(),
                LoggingRoleSync,
            )));
        if let Some(path) = &config.journal_path {
            dispatcher = dispatcher.with_subscriber(Arc::new(AuditJournal::open(path)?));
        }
        debug!(subscribers = ?dispatcher.subscriber_names(), "dispatcher ready");

        Ok(Self {
            engine: ModerationEngine::new(Arc::new(store), config, bus),
            actor,
            dispatcher: dispatcher.spawn(),
        })
    }

    /// Drop the engine (closing the bus) and wait for pending deliveries
    pub async fn shutdown(self) -> Result<DispatchStats, anyhow::Error> {
        let Self {
            engine, dispatcher, ..
        } = self;
        let store = engine.store().clone();
        drop(engine);

        let stats = dispatcher.await?;
        store.close().await;
        Ok(stats)
    }
}
