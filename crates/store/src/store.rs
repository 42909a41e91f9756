//! Record store abstraction

use async_trait::async_trait;
use roster_core::GameId;

use crate::error::StoreResult;
use crate::record::{
    BanActivation, BanRecord, Escalation, HistoryEntry, Member, NewMember, Upserted,
    WarningAppend, WarningEntry, WarningLedger, WarningRemoval,
};

/// Persistence over members, warning ledgers and ban records
///
/// Each method is a single atomic operation with respect to the id(s) it
/// touches. Callers never compose a separate read and write to get
/// read-modify-write semantics; the conditional logic lives here.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // === Members ===

    async fn get_member(&self, game_id: &GameId) -> StoreResult<Option<Member>>;

    /// Insert-if-absent upsert
    ///
    /// Identity fields are written only when the member does not exist yet;
    /// `audit` is appended to the history either way.
    async fn insert_member_if_absent(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>>;

    /// Set the rank, creating the member from `member` when absent
    ///
    /// Only `rank` is overwritten on an existing member. `audit` is always
    /// appended.
    async fn set_member_rank(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>>;

    /// Append to an existing member's history; returns `false` if absent
    async fn append_history(&self, game_id: &GameId, entry: HistoryEntry) -> StoreResult<bool>;

    /// Hard-delete members, returning the ids that existed
    async fn delete_members(&self, game_ids: &[GameId]) -> StoreResult<Vec<GameId>>;

    /// All members ordered by ascending `joined_at`
    async fn list_members(&self) -> StoreResult<Vec<Member>>;

    // === Warning ledgers ===

    async fn get_warnings(&self, game_id: &GameId) -> StoreResult<Option<WarningLedger>>;

    /// Append a warning, count the ledger and apply `escalation`, atomically
    async fn append_warning(
        &self,
        game_id: &GameId,
        entry: WarningEntry,
        escalation: Escalation,
    ) -> StoreResult<WarningAppend>;

    /// Remove the entry at 1-based `index` and report the remaining length,
    /// atomically; `None` if ledger or index is absent
    async fn remove_warning(
        &self,
        game_id: &GameId,
        index: usize,
    ) -> StoreResult<Option<WarningRemoval>>;

    // === Bans ===

    async fn get_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>>;

    /// Active bans among the given ids
    async fn active_bans_among(&self, game_ids: &[GameId]) -> StoreResult<Vec<BanRecord>>;

    /// Activate (or overwrite) the single ban slot
    async fn activate_ban(
        &self,
        game_id: &GameId,
        activation: BanActivation,
    ) -> StoreResult<BanRecord>;

    /// Clear the active flag; `None` unless an active ban was lifted
    async fn deactivate_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>>;

    /// Active bans ordered by descending timestamp
    async fn list_active_bans(&self) -> StoreResult<Vec<BanRecord>>;
}
