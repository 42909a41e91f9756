//! Membership role synchronisation boundary

use async_trait::async_trait;
use roster_core::LinkedIdentity;
use tracing::info;

use crate::error::BusError;
use crate::event::{ModerationEvent, RoleSignal};
use crate::subscriber::EventSubscriber;

/// External platform capable of granting and removing the membership role
#[async_trait]
pub trait RoleSync: Send + Sync {
    async fn revoke(&self, identity: &LinkedIdentity, role_id: &str) -> Result<(), BusError>;

    async fn restore(&self, identity: &LinkedIdentity, role_id: &str) -> Result<(), BusError>;
}

/// Applies [`RoleSignal`]s from committed outcomes through a [`RoleSync`]
pub struct RoleSyncSubscriber<R> {
    role_id: String,
    sync: R,
}

impl<R: RoleSync> RoleSyncSubscriber<R> {
    pub fn new(role_id: impl Into<String>, sync: R) -> Self {
        Self {
            role_id: role_id.into(),
            sync,
        }
    }

    pub fn sync(&self) -> &R {
        &self.sync
    }
}

#[async_trait]
impl<R: RoleSync> EventSubscriber for RoleSyncSubscriber<R> {
    fn name(&self) -> &str {
        "role-sync"
    }

    async fn handle(&self, event: &ModerationEvent) -> Result<(), BusError> {
        match event.outcome.role_signal() {
            Some(RoleSignal::Revoke(identity)) => self.sync.revoke(&identity, &self.role_id).await,
            Some(RoleSignal::Restore(identity)) => {
                self.sync.restore(&identity, &self.role_id).await
            }
            None => Ok(()),
        }
    }
}

/// Role sync that only records the intent in the log
///
/// Used when no chat platform is attached (operator CLI).
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingRoleSync;

#[async_trait]
impl RoleSync for LoggingRoleSync {
    async fn revoke(&self, identity: &LinkedIdentity, role_id: &str) -> Result<(), BusError> {
        info!(identity = %identity, role_id, "revoke membership role");
        Ok(())
    }

    async fn restore(&self, identity: &LinkedIdentity, role_id: &str) -> Result<(), BusError> {
        info!(identity = %identity, role_id, "restore membership role");
        Ok(())
    }
}
