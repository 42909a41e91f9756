//! Read-only views returned by list, ban-check and warnlog

use roster_core::{GameId, Rank};
use roster_store::{BanRecord, Member, WarningEntry};
use serde::Serialize;

/// Members holding one rank, ascending by join date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankBucket {
    pub rank: Rank,
    pub members: Vec<Member>,
}

/// The roster grouped by rank, top of the ladder first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterListing {
    pub buckets: Vec<RankBucket>,
}

impl RosterListing {
    /// Group members (already sorted by join date) into the four buckets
    pub fn from_sorted(members: Vec<Member>) -> Self {
        let mut buckets: Vec<RankBucket> = Rank::LADDER
            .iter()
            .map(|&rank| RankBucket {
                rank,
                members: Vec::new(),
            })
            .collect();

        for member in members {
            if let Some(bucket) = buckets.iter_mut().find(|b| b.rank == member.rank) {
                bucket.members.push(member);
            }
        }

        Self { buckets }
    }

    pub fn bucket(&self, rank: Rank) -> &[Member] {
        self.buckets
            .iter()
            .find(|b| b.rank == rank)
            .map(|b| b.members.as_slice())
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.members.len()).sum()
    }

    pub fn contains(&self, game_id: &GameId) -> bool {
        self.buckets
            .iter()
            .flat_map(|b| &b.members)
            .any(|m| &m.game_id == game_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BanStatus {
    NotBanned,
    Banned(BanRecord),
}

impl BanStatus {
    pub fn is_banned(&self) -> bool {
        matches!(self, BanStatus::Banned(_))
    }
}

/// A ledger's entries in order; empty when no ledger exists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarnLog {
    pub game_id: GameId,
    pub entries: Vec<WarningEntry>,
    pub threshold: usize,
}

impl WarnLog {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }
}
