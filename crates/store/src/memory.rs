//! In-memory record store

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use roster_core::GameId;

use crate::error::{StoreError, StoreResult};
use crate::record::{
    BanActivation, BanRecord, Escalation, HistoryEntry, Member, NewMember, Upserted,
    WarningAppend, WarningEntry, WarningLedger, WarningRemoval,
};
use crate::store::RecordStore;

/// In-memory store for tests, simulations and ephemeral runs
///
/// All three collections sit behind one mutex, so every trait method is a
/// single critical section. The lock is never held across an `.await`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Collections>>,
}

#[derive(Default)]
struct Collections {
    members: HashMap<GameId, Member>,
    ledgers: HashMap<GameId, WarningLedger>,
    bans: HashMap<GameId, BanRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Collections>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_member(&self, game_id: &GameId) -> StoreResult<Option<Member>> {
        Ok(self.lock()?.members.get(game_id).cloned())
    }

    async fn insert_member_if_absent(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>> {
        let mut inner = self.lock()?;
        let mut created = false;

        let stored = inner
            .members
            .entry(member.game_id.clone())
            .or_insert_with(|| {
                created = true;
                member.into_member(Vec::new())
            });
        stored.history.push(audit);

        Ok(Upserted {
            record: stored.clone(),
            created,
        })
    }

    async fn set_member_rank(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>> {
        let mut inner = self.lock()?;
        let rank = member.rank;
        let mut created = false;

        let stored = inner
            .members
            .entry(member.game_id.clone())
            .or_insert_with(|| {
                created = true;
                member.into_member(Vec::new())
            });
        stored.rank = rank;
        stored.history.push(audit);

        Ok(Upserted {
            record: stored.clone(),
            created,
        })
    }

    async fn append_history(&self, game_id: &GameId, entry: HistoryEntry) -> StoreResult<bool> {
        let mut inner = self.lock()?;
        match inner.members.get_mut(game_id) {
            Some(member) => {
                member.history.push(entry);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_members(&self, game_ids: &[GameId]) -> StoreResult<Vec<GameId>> {
        let mut inner = self.lock()?;
        Ok(game_ids
            .iter()
            .filter(|id| inner.members.remove(*id).is_some())
            .cloned()
            .collect())
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        let inner = self.lock()?;
        let mut members: Vec<Member> = inner.members.values().cloned().collect();
        members.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        Ok(members)
    }

    async fn get_warnings(&self, game_id: &GameId) -> StoreResult<Option<WarningLedger>> {
        Ok(self.lock()?.ledgers.get(game_id).cloned())
    }

    async fn append_warning(
        &self,
        game_id: &GameId,
        entry: WarningEntry,
        escalation: Escalation,
    ) -> StoreResult<WarningAppend> {
        let mut inner = self.lock()?;

        let ledger = inner
            .ledgers
            .entry(game_id.clone())
            .or_insert_with(|| WarningLedger::new(game_id.clone()));
        ledger.entries.push(entry);
        let count = ledger.count();

        let already_banned = inner.bans.get(game_id).is_some_and(|ban| ban.active);
        let escalated = if escalation.fires(count, already_banned) {
            let record = escalation.ban.into_record(game_id.clone());
            inner.bans.insert(game_id.clone(), record.clone());
            Some(record)
        } else {
            None
        };

        Ok(WarningAppend { count, escalated })
    }

    async fn remove_warning(
        &self,
        game_id: &GameId,
        index: usize,
    ) -> StoreResult<Option<WarningRemoval>> {
        let mut inner = self.lock()?;
        let Some(ledger) = inner.ledgers.get_mut(game_id) else {
            return Ok(None);
        };
        if index == 0 || index > ledger.entries.len() {
            return Ok(None);
        }
        let entry = ledger.entries.remove(index - 1);
        Ok(Some(WarningRemoval {
            entry,
            remaining: ledger.entries.len(),
        }))
    }

    async fn get_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>> {
        Ok(self.lock()?.bans.get(game_id).cloned())
    }

    async fn active_bans_among(&self, game_ids: &[GameId]) -> StoreResult<Vec<BanRecord>> {
        let inner = self.lock()?;
        Ok(game_ids
            .iter()
            .filter_map(|id| inner.bans.get(id))
            .filter(|ban| ban.active)
            .cloned()
            .collect())
    }

    async fn activate_ban(
        &self,
        game_id: &GameId,
        activation: BanActivation,
    ) -> StoreResult<BanRecord> {
        let mut inner = self.lock()?;
        let record = activation.into_record(game_id.clone());
        inner.bans.insert(game_id.clone(), record.clone());
        Ok(record)
    }

    async fn deactivate_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>> {
        let mut inner = self.lock()?;
        Ok(inner
            .bans
            .get_mut(game_id)
            .filter(|ban| ban.active)
            .map(|ban| {
                ban.active = false;
                ban.clone()
            }))
    }

    async fn list_active_bans(&self) -> StoreResult<Vec<BanRecord>> {
        let inner = self.lock()?;
        let mut bans: Vec<BanRecord> = inner.bans.values().filter(|b| b.active).cloned().collect();
        bans.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        Ok(bans)
    }
}
