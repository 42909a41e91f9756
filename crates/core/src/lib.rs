//! Roster Core - Domain types
//!
//! This crate contains the fundamental types used across the roster:
//! - `GameId`: Validated, case-preserving identity key shared by every record
//! - `LinkedIdentity`: Optional chat-platform user the roster entry is tied to
//! - `Rank`: The fixed four-level ladder and its promote/demote targets
//! - `day`: `DD/MM/YYYY` join-date input handling

pub mod day;
pub mod identity;
pub mod rank;

pub use day::{format_day, parse_day, resolve_day};
pub use identity::{parse_batch, GameId, IdentityError, LinkedIdentity};
pub use rank::{Rank, RankChange, RankError};
