//! Rank ladder
//!
//! Ordering: `Member < Sergeant < Deputy < Leader`
//!
//! `promote` may only target Deputy or Sergeant and `demote` only Sergeant or
//! Member. Leader is reachable through `add` alone. Targets are not required
//! to be adjacent to the current rank.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Errors from rank handling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
    #[error("Unknown rank: {0}")]
    Unknown(String),

    #[error("Cannot promote to {0} (allowed: deputy, sergeant)")]
    NotPromotable(Rank),

    #[error("Cannot demote to {0} (allowed: sergeant, member)")]
    NotDemotable(Rank),
}

/// Roster rank
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Rank {
    Leader = 4,
    Deputy = 3,
    Sergeant = 2,
    #[default]
    Member = 1,
}

impl Rank {
    /// Ladder from the top down (the order `list` renders buckets in)
    pub const LADDER: [Rank; 4] = [Rank::Leader, Rank::Deputy, Rank::Sergeant, Rank::Member];

    /// Ranks `promote` may assign
    pub const PROMOTION_TARGETS: [Rank; 2] = [Rank::Deputy, Rank::Sergeant];

    /// Ranks `demote` may assign
    pub const DEMOTION_TARGETS: [Rank; 2] = [Rank::Sergeant, Rank::Member];

    /// Stable storage code
    pub fn code(&self) -> &'static str {
        self.into()
    }

    /// Parse a storage code, rejecting anything outside the ladder
    pub fn from_code(code: &str) -> Result<Self, RankError> {
        code.parse()
            .map_err(|_| RankError::Unknown(code.to_string()))
    }

    fn level(&self) -> u8 {
        *self as u8
    }
}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

/// Direction of a rank change command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RankChange {
    Promote,
    Demote,
}

impl RankChange {
    /// Ranks this command may assign
    pub fn targets(&self) -> &'static [Rank] {
        match self {
            RankChange::Promote => &Rank::PROMOTION_TARGETS,
            RankChange::Demote => &Rank::DEMOTION_TARGETS,
        }
    }

    /// Check a requested target against this command's table
    pub fn check(&self, target: Rank) -> Result<Rank, RankError> {
        if self.targets().contains(&target) {
            return Ok(target);
        }
        Err(match self {
            RankChange::Promote => RankError::NotPromotable(target),
            RankChange::Demote => RankError::NotDemotable(target),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_rank_ordering() {
        assert!(Rank::Member < Rank::Sergeant);
        assert!(Rank::Sergeant < Rank::Deputy);
        assert!(Rank::Deputy < Rank::Leader);
    }

    #[test]
    fn test_default_is_member() {
        assert_eq!(Rank::default(), Rank::Member);
    }

    #[test]
    fn test_ladder_is_descending() {
        let mut sorted = Rank::LADDER;
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Rank::LADDER);
        assert_eq!(Rank::iter().count(), Rank::LADDER.len());
    }

    #[test]
    fn test_code_round_trip() {
        for rank in Rank::LADDER {
            assert_eq!(Rank::from_code(rank.code()).unwrap(), rank);
        }
        assert_eq!(Rank::from_code("SERGEANT").unwrap(), Rank::Sergeant);
    }

    #[test]
    fn test_unknown_rank() {
        assert_eq!(
            Rank::from_code("captain"),
            Err(RankError::Unknown("captain".to_string()))
        );
    }

    #[test]
    fn test_promote_targets() {
        assert_eq!(RankChange::Promote.check(Rank::Deputy), Ok(Rank::Deputy));
        assert_eq!(RankChange::Promote.check(Rank::Sergeant), Ok(Rank::Sergeant));
        assert_eq!(
            RankChange::Promote.check(Rank::Leader),
            Err(RankError::NotPromotable(Rank::Leader))
        );
        assert_eq!(
            RankChange::Promote.check(Rank::Member),
            Err(RankError::NotPromotable(Rank::Member))
        );
    }

    #[test]
    fn test_demote_targets() {
        assert_eq!(RankChange::Demote.check(Rank::Sergeant), Ok(Rank::Sergeant));
        assert_eq!(RankChange::Demote.check(Rank::Member), Ok(Rank::Member));
        assert_eq!(
            RankChange::Demote.check(Rank::Leader),
            Err(RankError::NotDemotable(Rank::Leader))
        );
        assert_eq!(
            RankChange::Demote.check(Rank::Deputy),
            Err(RankError::NotDemotable(Rank::Deputy))
        );
    }

    #[test]
    fn test_rank_serialization() {
        assert_eq!(serde_json::to_string(&Rank::Deputy).unwrap(), "\"deputy\"");
        assert_eq!(Rank::Sergeant.to_string(), "sergeant");
    }
}
