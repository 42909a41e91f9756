//! Roster Store - persistence for the three roster collections
//!
//! ```text
//!   members          warning ledgers        bans
//!   ├── identity     ├── entries (ordered)  ├── single slot per id
//!   └── history      └── never deleted      └── active flag
//!          \               |                    /
//!           └──────── keyed by GameId ─────────┘
//! ```
//!
//! Every mutation in [`RecordStore`] is one atomic operation: the memory
//! backend runs it inside a single critical section, the SQLite backend
//! inside a single write transaction.

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::{
    ActionKind, BanActivation, BanRecord, Escalation, HistoryEntry, Member, NewMember, Upserted,
    WarningAppend, WarningEntry, WarningLedger, WarningRemoval,
};
pub use sqlite::SqliteStore;
pub use store::RecordStore;
