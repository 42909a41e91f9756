//! Moderation engine

use std::sync::Arc;

use chrono::Utc;
use roster_bus::{
    AddOutcome, AddedMember, BanOutcome, EventBus, ModerationEvent, Outcome, RankOutcome,
    RemoveOutcome, RemovedId, UnbanOutcome, UnwarnOutcome, WarnOutcome,
};
use roster_core::{resolve_day, GameId, RankChange};
use roster_store::{
    ActionKind, BanActivation, BanRecord, Escalation, HistoryEntry, NewMember, RecordStore,
    WarningEntry, WarningRemoval,
};
use tracing::{info, warn};

use crate::actor::Actor;
use crate::audit;
use crate::config::RosterConfig;
use crate::error::{EngineError, EngineResult};
use crate::request::{AddRequest, BanRequest, RankRequest, RemoveRequest, UnbanRequest, WarnRequest};
use crate::view::{BanStatus, RosterListing, WarnLog};

/// Ledger length at which a warning escalates to a ban
pub const WARN_THRESHOLD: usize = 3;

/// Ban reason recorded when escalation fires
pub const ESCALATION_REASON: &str = "reached 3 warnings";

/// Applies moderation operations to a [`RecordStore`]
///
/// Every mutation commits in the store first, then publishes its outcome
/// on the bus. Role sync and notification happen on the bus side and can
/// never undo a committed mutation.
pub struct ModerationEngine<S> {
    store: Arc<S>,
    config: Arc<RosterConfig>,
    bus: EventBus,
}

impl<S: RecordStore> ModerationEngine<S> {
    pub fn new(store: Arc<S>, config: RosterConfig, bus: EventBus) -> Self {
        Self {
            store,
            config: Arc::new(config),
            bus,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    // === Membership ===

    /// Add a batch of members
    ///
    /// The whole batch is rejected if any id is actively banned. The ban
    /// check and the inserts are separate store calls, so a ban landing in
    /// between is not seen.
    pub async fn add(&self, actor: &Actor, req: AddRequest) -> EngineResult<AddOutcome> {
        actor.require_admin()?;
        if req.ids.is_empty() {
            return Err(EngineError::Validation(
                "at least one game id is required".to_string(),
            ));
        }

        let banned = self.store.active_bans_among(&req.ids).await?;
        if !banned.is_empty() {
            let banned: Vec<GameId> = banned.into_iter().map(|b| b.game_id).collect();
            warn!(actor = %actor.id, banned = banned.len(), "add rejected: banned ids in batch");
            return Err(EngineError::Conflict { banned });
        }

        let now = Utc::now();
        let joined_at = resolve_day(req.day.as_deref(), now);
        let rank = req.rank.unwrap_or_default();
        let note = req.normalized_note();

        let mut members = Vec::with_capacity(req.ids.len());
        for game_id in &req.ids {
            let new_member = NewMember {
                game_id: game_id.clone(),
                linked_identity: req.linked_identity.clone(),
                rank,
                joined_at,
                notes: note.clone().unwrap_or_default(),
            };
            let upserted = self
                .store
                .insert_member_if_absent(new_member, audit::add(actor, now, rank, note.as_deref()))
                .await?;

            info!(
                game_id = %game_id,
                actor = %actor.id,
                created = upserted.created,
                "member added"
            );
            members.push(AddedMember {
                game_id: upserted.record.game_id,
                linked_identity: upserted.record.linked_identity,
                created: upserted.created,
            });
        }

        let outcome = AddOutcome {
            members,
            rank,
            joined_at,
            note,
        };
        self.publish(actor, Outcome::Added(outcome.clone()));
        Ok(outcome)
    }

    /// Hard-delete members; warning ledgers and bans are untouched
    pub async fn remove(&self, actor: &Actor, req: RemoveRequest) -> EngineResult<RemoveOutcome> {
        actor.require_admin()?;
        if req.ids.is_empty() {
            return Err(EngineError::Validation(
                "at least one game id is required".to_string(),
            ));
        }

        let existed = self.store.delete_members(&req.ids).await?;
        let ids: Vec<RemovedId> = req
            .ids
            .iter()
            .map(|game_id| RemovedId {
                game_id: game_id.clone(),
                existed: existed.contains(game_id),
            })
            .collect();

        let outcome = RemoveOutcome {
            ids,
            effective_at: resolve_day(req.day.as_deref(), Utc::now()),
            note: req.normalized_note(),
        };
        info!(
            actor = %actor.id,
            requested = outcome.ids.len(),
            removed = outcome.removed_count(),
            "members removed"
        );
        self.publish(actor, Outcome::Removed(outcome.clone()));
        Ok(outcome)
    }

    pub async fn list(&self) -> EngineResult<RosterListing> {
        let members = self.store.list_members().await?;
        Ok(RosterListing::from_sorted(members))
    }

    pub async fn promote(&self, actor: &Actor, req: RankRequest) -> EngineResult<RankOutcome> {
        let outcome = self.change_rank(actor, RankChange::Promote, req).await?;
        self.publish(actor, Outcome::Promoted(outcome.clone()));
        Ok(outcome)
    }

    pub async fn demote(&self, actor: &Actor, req: RankRequest) -> EngineResult<RankOutcome> {
        let outcome = self.change_rank(actor, RankChange::Demote, req).await?;
        self.publish(actor, Outcome::Demoted(outcome.clone()));
        Ok(outcome)
    }

    /// Upsert with defaults and set the rank unconditionally
    async fn change_rank(
        &self,
        actor: &Actor,
        change: RankChange,
        req: RankRequest,
    ) -> EngineResult<RankOutcome> {
        let rank = change.check(req.rank)?;
        let action = match change {
            RankChange::Promote => ActionKind::Promote,
            RankChange::Demote => ActionKind::Demote,
        };

        let now = Utc::now();
        let mut new_member = NewMember::with_defaults(req.game_id.clone(), now);
        new_member.rank = rank;
        new_member.linked_identity = req.linked_identity.clone();

        let upserted = self
            .store
            .set_member_rank(new_member, audit::rank_change(action, actor, now, rank))
            .await?;

        info!(
            game_id = %req.game_id,
            actor = %actor.id,
            %action,
            rank = %rank,
            created = upserted.created,
            "member rank changed"
        );
        Ok(RankOutcome {
            game_id: req.game_id,
            rank,
            linked_identity: req.linked_identity,
            created: upserted.created,
        })
    }

    // === Warnings ===

    /// Append a warning; the third one activates a ban
    ///
    /// Append, count and escalation are one store operation, so concurrent
    /// warns for the same id produce exactly one escalation per crossing.
    pub async fn warn(&self, actor: &Actor, req: WarnRequest) -> EngineResult<WarnOutcome> {
        let req = req.validated()?;
        let now = Utc::now();

        let entry = WarningEntry {
            reason: req.reason.clone(),
            timestamp: now,
            moderator_id: actor.id.clone(),
            evidence_ref: req.evidence_ref.clone(),
        };
        let escalation = Escalation {
            threshold: WARN_THRESHOLD,
            ban: BanActivation {
                reason: ESCALATION_REASON.to_string(),
                moderator_id: actor.id.clone(),
                timestamp: now,
                linked_identity: req.linked_identity.clone(),
                evidence_ref: req.evidence_ref.clone(),
            },
        };

        let appended = self
            .store
            .append_warning(&req.game_id, entry, escalation)
            .await?;

        let escalated = appended.escalated.is_some();
        info!(
            game_id = %req.game_id,
            actor = %actor.id,
            count = appended.count,
            escalated,
            "member warned"
        );
        if escalated {
            warn!(game_id = %req.game_id, "warning threshold reached; ban activated");
        }

        let outcome = WarnOutcome {
            game_id: req.game_id.clone(),
            reason: req.reason.clone(),
            count: appended.count,
            threshold: WARN_THRESHOLD,
            evidence_ref: req.evidence_ref,
            linked_identity: req.linked_identity,
            escalated: appended.escalated,
        };
        self.publish(actor, Outcome::Warned(outcome.clone()));
        self.audit_existing(
            &req.game_id,
            audit::warn(actor, now, &req.reason, appended.count, escalated),
        )
        .await;
        Ok(outcome)
    }

    /// Remove the warning at 1-based `index`; never lifts an escalation ban
    pub async fn unwarn(
        &self,
        actor: &Actor,
        game_id: &GameId,
        index: usize,
    ) -> EngineResult<UnwarnOutcome> {
        let WarningRemoval { entry, remaining } = self
            .store
            .remove_warning(game_id, index)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("warning #{index} for {game_id}")))?;

        info!(game_id = %game_id, actor = %actor.id, index, remaining, "warning removed");
        let outcome = UnwarnOutcome {
            game_id: game_id.clone(),
            index,
            removed: entry,
            remaining,
        };
        self.publish(actor, Outcome::Unwarned(outcome.clone()));
        self.audit_existing(
            game_id,
            audit::unwarn(actor, Utc::now(), index, &outcome.removed.reason),
        )
        .await;
        Ok(outcome)
    }

    pub async fn warnlog(&self, game_id: &GameId) -> EngineResult<WarnLog> {
        let entries = self
            .store
            .get_warnings(game_id)
            .await?
            .map(|ledger| ledger.entries)
            .unwrap_or_default();

        Ok(WarnLog {
            game_id: game_id.clone(),
            entries,
            threshold: WARN_THRESHOLD,
        })
    }

    // === Bans ===

    /// Activate or overwrite the ban slot unconditionally
    pub async fn ban(&self, actor: &Actor, req: BanRequest) -> EngineResult<BanOutcome> {
        let req = req.validated()?;
        let now = Utc::now();

        let ban = self
            .store
            .activate_ban(
                &req.game_id,
                BanActivation {
                    reason: req.reason.clone(),
                    moderator_id: actor.id.clone(),
                    timestamp: now,
                    linked_identity: req.linked_identity,
                    evidence_ref: req.evidence_ref.clone(),
                },
            )
            .await?;

        info!(game_id = %req.game_id, actor = %actor.id, "member banned");
        let outcome = BanOutcome { ban };
        self.publish(actor, Outcome::Banned(outcome.clone()));
        self.audit_existing(
            &req.game_id,
            audit::ban(actor, now, &req.reason, req.evidence_ref.as_deref()),
        )
        .await;
        Ok(outcome)
    }

    /// Deactivate the ban slot; succeeds even if no ban is active
    pub async fn unban(&self, actor: &Actor, req: UnbanRequest) -> EngineResult<UnbanOutcome> {
        let reason = req.normalized_reason();
        let lifted = self.store.deactivate_ban(&req.game_id).await?;

        info!(
            game_id = %req.game_id,
            actor = %actor.id,
            was_banned = lifted.is_some(),
            "ban lifted"
        );
        let outcome = UnbanOutcome {
            game_id: req.game_id.clone(),
            reason: reason.clone(),
            linked_identity: req.linked_identity,
            lifted,
        };
        self.publish(actor, Outcome::Unbanned(outcome.clone()));
        self.audit_existing(
            &req.game_id,
            audit::unban(actor, Utc::now(), reason.as_deref()),
        )
        .await;
        Ok(outcome)
    }

    pub async fn ban_check(&self, game_id: &GameId) -> EngineResult<BanStatus> {
        Ok(match self.store.get_ban(game_id).await? {
            Some(ban) if ban.active => BanStatus::Banned(ban),
            _ => BanStatus::NotBanned,
        })
    }

    /// Active bans, newest first
    pub async fn list_bans(&self) -> EngineResult<Vec<BanRecord>> {
        Ok(self.store.list_active_bans().await?)
    }

    // === Side effects ===

    fn publish(&self, actor: &Actor, outcome: Outcome) {
        let event = ModerationEvent::new(actor.id.clone(), outcome);
        self.bus.publish(event);
    }

    /// Append to the member's history if the member exists
    ///
    /// Runs after the primary mutation committed; a failure is logged and
    /// does not fail the operation.
    async fn audit_existing(&self, game_id: &GameId, entry: HistoryEntry) {
        let action = entry.action;
        match self.store.append_history(game_id, entry).await {
            Ok(_) => {}
            Err(e) => warn!(game_id = %game_id, %action, error = %e, "history append failed"),
        }
    }
}
