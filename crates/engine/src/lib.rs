//! Roster Engine - moderation ledger & membership state transitions
//!
//! Flow of every mutating operation:
//!
//! ```text
//! capability check → input validation → atomic store operation
//!   → publish outcome event → audit append (existing members)
//! ```
//!
//! The engine holds no locks of its own. Same-id consistency comes from the
//! store's atomic operations; side effects run on the bus after commit.

pub mod actor;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod request;
pub mod view;

pub use actor::Actor;
pub use config::RosterConfig;
pub use engine::{ModerationEngine, ESCALATION_REASON, WARN_THRESHOLD};
pub use error::{EngineError, EngineResult};
pub use request::{AddRequest, BanRequest, RankRequest, RemoveRequest, UnbanRequest, WarnRequest};
pub use view::{BanStatus, RankBucket, RosterListing, WarnLog};
