//! SQLite record store
//!
//! Every mutation runs in one transaction whose first statement is a write,
//! so SQLite's write lock is held for the whole read-modify-write and
//! concurrent writers on other connections queue behind it.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use roster_core::{GameId, LinkedIdentity, Rank};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::record::{
    ActionKind, BanActivation, BanRecord, Escalation, HistoryEntry, Member, NewMember, Upserted,
    WarningAppend, WarningEntry, WarningLedger, WarningRemoval,
};
use crate::store::RecordStore;

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing pool (schema must be initialized with [`init`](Self::init))
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL and initialize the schema
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = SqlitePool::connect(url).await?;
        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Open (or create) a database file and initialize the schema
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let url = format!("sqlite:{}?mode=rwc", path.as_ref().display());
        Self::connect(&url).await
    }

    /// Private in-memory database (for testing)
    ///
    /// A single pooled connection that never expires, since every SQLite
    /// `:memory:` connection is its own database.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self::new(pool);
        store.init().await?;
        Ok(store)
    }

    /// Initialize the schema
    pub async fn init(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                game_id TEXT PRIMARY KEY,
                linked_identity TEXT,
                rank TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                notes TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS member_history (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                action TEXT NOT NULL,
                actor_id TEXT NOT NULL,
                details TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_member_history_game
            ON member_history(game_id, seq)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warning_ledgers (
                game_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS warnings (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                ts TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                evidence_ref TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_warnings_game
            ON warnings(game_id, seq)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bans (
                game_id TEXT PRIMARY KEY,
                active INTEGER NOT NULL,
                reason TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                linked_identity TEXT,
                evidence_ref TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_bans_active
            ON bans(active, ts)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

// === Encoding helpers ===

/// Fixed-width RFC 3339 so that text order equals time order
fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_ts(game_id: &str, raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::corrupt(game_id, format!("bad timestamp {raw:?}: {e}")))
}

fn decode_game_id(raw: &str) -> StoreResult<GameId> {
    GameId::new(raw).map_err(|e| StoreError::corrupt(raw, e.to_string()))
}

fn decode_linked(game_id: &str, raw: Option<String>) -> StoreResult<Option<LinkedIdentity>> {
    raw.map(|s| LinkedIdentity::new(s).map_err(|e| StoreError::corrupt(game_id, e.to_string())))
        .transpose()
}

fn member_row(row: &SqliteRow) -> StoreResult<Member> {
    let raw_id: String = row.get("game_id");
    let rank_code: String = row.get("rank");
    let joined_at: String = row.get("joined_at");

    Ok(Member {
        game_id: decode_game_id(&raw_id)?,
        linked_identity: decode_linked(&raw_id, row.get("linked_identity"))?,
        rank: Rank::from_code(&rank_code).map_err(|e| StoreError::corrupt(&raw_id, e.to_string()))?,
        joined_at: decode_ts(&raw_id, &joined_at)?,
        notes: row.get("notes"),
        history: Vec::new(),
    })
}

fn history_row(row: &SqliteRow) -> StoreResult<HistoryEntry> {
    let raw_id: String = row.get("game_id");
    let ts: String = row.get("ts");
    let action: String = row.get("action");
    let details: String = row.get("details");

    Ok(HistoryEntry {
        timestamp: decode_ts(&raw_id, &ts)?,
        action: action
            .parse::<ActionKind>()
            .map_err(|_| StoreError::corrupt(&raw_id, format!("unknown action {action:?}")))?,
        actor_id: row.get("actor_id"),
        details: serde_json::from_str(&details)?,
    })
}

fn warning_row(game_id: &str, row: &SqliteRow) -> StoreResult<WarningEntry> {
    let ts: String = row.get("ts");
    Ok(WarningEntry {
        reason: row.get("reason"),
        timestamp: decode_ts(game_id, &ts)?,
        moderator_id: row.get("moderator_id"),
        evidence_ref: row.get("evidence_ref"),
    })
}

fn ban_row(row: &SqliteRow) -> StoreResult<BanRecord> {
    let raw_id: String = row.get("game_id");
    let ts: String = row.get("ts");
    Ok(BanRecord {
        game_id: decode_game_id(&raw_id)?,
        active: row.get::<i64, _>("active") != 0,
        reason: row.get("reason"),
        moderator_id: row.get("moderator_id"),
        timestamp: decode_ts(&raw_id, &ts)?,
        linked_identity: decode_linked(&raw_id, row.get("linked_identity"))?,
        evidence_ref: row.get("evidence_ref"),
    })
}

// === Statements shared by several operations (run on an open transaction) ===

const MEMBER_COLUMNS: &str = "game_id, linked_identity, rank, joined_at, notes";
const BAN_COLUMNS: &str =
    "game_id, active, reason, moderator_id, ts, linked_identity, evidence_ref";

async fn insert_history(
    conn: &mut SqliteConnection,
    game_id: &GameId,
    entry: &HistoryEntry,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO member_history (game_id, ts, action, actor_id, details)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(game_id.as_str())
    .bind(encode_ts(entry.timestamp))
    .bind(entry.action.as_str())
    .bind(&entry.actor_id)
    .bind(serde_json::to_string(&entry.details)?)
    .execute(conn)
    .await?;
    Ok(())
}

async fn load_member(conn: &mut SqliteConnection, game_id: &GameId) -> StoreResult<Option<Member>> {
    let row = sqlx::query(&format!(
        "SELECT {MEMBER_COLUMNS} FROM members WHERE game_id = ?"
    ))
    .bind(game_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let mut member = member_row(&row)?;

    let history = sqlx::query(
        r#"
        SELECT game_id, ts, action, actor_id, details
        FROM member_history
        WHERE game_id = ?
        ORDER BY seq
        "#,
    )
    .bind(game_id.as_str())
    .fetch_all(&mut *conn)
    .await?;

    member.history = history.iter().map(history_row).collect::<StoreResult<_>>()?;
    Ok(Some(member))
}

async fn load_ban(conn: &mut SqliteConnection, game_id: &GameId) -> StoreResult<Option<BanRecord>> {
    let row = sqlx::query(&format!("SELECT {BAN_COLUMNS} FROM bans WHERE game_id = ?"))
        .bind(game_id.as_str())
        .fetch_optional(conn)
        .await?;
    row.as_ref().map(ban_row).transpose()
}

async fn write_ban(
    conn: &mut SqliteConnection,
    game_id: &GameId,
    activation: &BanActivation,
) -> StoreResult<()> {
    sqlx::query(
        r#"
        INSERT INTO bans (game_id, active, reason, moderator_id, ts, linked_identity, evidence_ref)
        VALUES (?, 1, ?, ?, ?, ?, ?)
        ON CONFLICT(game_id) DO UPDATE SET
            active = 1,
            reason = excluded.reason,
            moderator_id = excluded.moderator_id,
            ts = excluded.ts,
            linked_identity = excluded.linked_identity,
            evidence_ref = excluded.evidence_ref
        "#,
    )
    .bind(game_id.as_str())
    .bind(&activation.reason)
    .bind(&activation.moderator_id)
    .bind(encode_ts(activation.timestamp))
    .bind(activation.linked_identity.as_ref().map(LinkedIdentity::as_str))
    .bind(activation.evidence_ref.as_deref())
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert the identity row if absent; returns whether it was created
async fn insert_member_row(conn: &mut SqliteConnection, member: &NewMember) -> StoreResult<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO members (game_id, linked_identity, rank, joined_at, notes)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(game_id) DO NOTHING
        "#,
    )
    .bind(member.game_id.as_str())
    .bind(member.linked_identity.as_ref().map(LinkedIdentity::as_str))
    .bind(member.rank.code())
    .bind(encode_ts(member.joined_at))
    .bind(&member.notes)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

fn missing_after_write(game_id: &GameId) -> StoreError {
    StoreError::corrupt(game_id.as_str(), "member vanished inside its own transaction")
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_member(&self, game_id: &GameId) -> StoreResult<Option<Member>> {
        let mut conn = self.pool.acquire().await?;
        load_member(&mut conn, game_id).await
    }

    async fn insert_member_if_absent(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>> {
        let mut tx = self.pool.begin().await?;

        let created = insert_member_row(&mut tx, &member).await?;
        insert_history(&mut tx, &member.game_id, &audit).await?;
        let record = load_member(&mut tx, &member.game_id)
            .await?
            .ok_or_else(|| missing_after_write(&member.game_id))?;

        tx.commit().await?;
        debug!(game_id = %member.game_id, created, "member upserted");
        Ok(Upserted { record, created })
    }

    async fn set_member_rank(
        &self,
        member: NewMember,
        audit: HistoryEntry,
    ) -> StoreResult<Upserted<Member>> {
        let mut tx = self.pool.begin().await?;

        let created = insert_member_row(&mut tx, &member).await?;
        if !created {
            sqlx::query("UPDATE members SET rank = ? WHERE game_id = ?")
                .bind(member.rank.code())
                .bind(member.game_id.as_str())
                .execute(&mut *tx)
                .await?;
        }
        insert_history(&mut tx, &member.game_id, &audit).await?;
        let record = load_member(&mut tx, &member.game_id)
            .await?
            .ok_or_else(|| missing_after_write(&member.game_id))?;

        tx.commit().await?;
        debug!(game_id = %member.game_id, rank = %member.rank, created, "member rank set");
        Ok(Upserted { record, created })
    }

    async fn append_history(&self, game_id: &GameId, entry: HistoryEntry) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO member_history (game_id, ts, action, actor_id, details)
            SELECT game_id, ?, ?, ?, ? FROM members WHERE game_id = ?
            "#,
        )
        .bind(encode_ts(entry.timestamp))
        .bind(entry.action.as_str())
        .bind(&entry.actor_id)
        .bind(serde_json::to_string(&entry.details)?)
        .bind(game_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_members(&self, game_ids: &[GameId]) -> StoreResult<Vec<GameId>> {
        let mut tx = self.pool.begin().await?;
        let mut existed = Vec::new();

        for game_id in game_ids {
            let result = sqlx::query("DELETE FROM members WHERE game_id = ?")
                .bind(game_id.as_str())
                .execute(&mut *tx)
                .await?;
            sqlx::query("DELETE FROM member_history WHERE game_id = ?")
                .bind(game_id.as_str())
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() > 0 {
                existed.push(game_id.clone());
            }
        }

        tx.commit().await?;
        Ok(existed)
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY joined_at ASC, game_id ASC"
        ))
        .fetch_all(&mut *conn)
        .await?;

        let history_rows = sqlx::query(
            r#"
            SELECT game_id, ts, action, actor_id, details
            FROM member_history
            ORDER BY seq
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;

        let mut history: HashMap<String, Vec<HistoryEntry>> = HashMap::new();
        for row in &history_rows {
            let game_id: String = row.get("game_id");
            history.entry(game_id).or_default().push(history_row(row)?);
        }

        rows.iter()
            .map(|row| -> StoreResult<Member> {
                let mut member = member_row(row)?;
                member.history = history.remove(member.game_id.as_str()).unwrap_or_default();
                Ok(member)
            })
            .collect()
    }

    async fn get_warnings(&self, game_id: &GameId) -> StoreResult<Option<WarningLedger>> {
        let mut conn = self.pool.acquire().await?;

        let exists = sqlx::query("SELECT 1 FROM warning_ledgers WHERE game_id = ?")
            .bind(game_id.as_str())
            .fetch_optional(&mut *conn)
            .await?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT reason, ts, moderator_id, evidence_ref
            FROM warnings
            WHERE game_id = ?
            ORDER BY seq
            "#,
        )
        .bind(game_id.as_str())
        .fetch_all(&mut *conn)
        .await?;

        let entries = rows
            .iter()
            .map(|row| warning_row(game_id.as_str(), row))
            .collect::<StoreResult<_>>()?;

        Ok(Some(WarningLedger {
            game_id: game_id.clone(),
            entries,
        }))
    }

    async fn append_warning(
        &self,
        game_id: &GameId,
        entry: WarningEntry,
        escalation: Escalation,
    ) -> StoreResult<WarningAppend> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO warning_ledgers (game_id, created_at) VALUES (?, ?)")
            .bind(game_id.as_str())
            .bind(encode_ts(entry.timestamp))
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO warnings (game_id, reason, ts, moderator_id, evidence_ref)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(game_id.as_str())
        .bind(&entry.reason)
        .bind(encode_ts(entry.timestamp))
        .bind(&entry.moderator_id)
        .bind(entry.evidence_ref.as_deref())
        .execute(&mut *tx)
        .await?;

        let count: i64 = sqlx::query("SELECT COUNT(*) AS count FROM warnings WHERE game_id = ?")
            .bind(game_id.as_str())
            .fetch_one(&mut *tx)
            .await?
            .get("count");
        let count = count as usize;

        let already_banned = load_ban(&mut tx, game_id)
            .await?
            .is_some_and(|ban| ban.active);

        let escalated = if escalation.fires(count, already_banned) {
            write_ban(&mut tx, game_id, &escalation.ban).await?;
            Some(escalation.ban.into_record(game_id.clone()))
        } else {
            None
        };

        tx.commit().await?;
        debug!(game_id = %game_id, count, escalated = escalated.is_some(), "warning appended");
        Ok(WarningAppend { count, escalated })
    }

    async fn remove_warning(
        &self,
        game_id: &GameId,
        index: usize,
    ) -> StoreResult<Option<WarningRemoval>> {
        let Some(offset) = index.checked_sub(1) else {
            return Ok(None);
        };
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            DELETE FROM warnings
            WHERE seq = (
                SELECT seq FROM warnings
                WHERE game_id = ?
                ORDER BY seq
                LIMIT 1 OFFSET ?
            )
            RETURNING reason, ts, moderator_id, evidence_ref
            "#,
        )
        .bind(game_id.as_str())
        .bind(offset)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let entry = warning_row(game_id.as_str(), &row)?;

        let remaining: i64 = sqlx::query("SELECT COUNT(*) AS count FROM warnings WHERE game_id = ?")
            .bind(game_id.as_str())
            .fetch_one(&mut *tx)
            .await?
            .get("count");

        tx.commit().await?;
        debug!(game_id = %game_id, index, remaining, "warning removed");
        Ok(Some(WarningRemoval {
            entry,
            remaining: remaining as usize,
        }))
    }

    async fn get_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>> {
        let mut conn = self.pool.acquire().await?;
        load_ban(&mut conn, game_id).await
    }

    async fn active_bans_among(&self, game_ids: &[GameId]) -> StoreResult<Vec<BanRecord>> {
        if game_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {BAN_COLUMNS} FROM bans WHERE active = 1 AND game_id IN ("
        ));
        let mut ids = query.separated(", ");
        for game_id in game_ids {
            ids.push_bind(game_id.as_str().to_string());
        }
        ids.push_unseparated(") ORDER BY game_id");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(ban_row).collect()
    }

    async fn activate_ban(
        &self,
        game_id: &GameId,
        activation: BanActivation,
    ) -> StoreResult<BanRecord> {
        let mut conn = self.pool.acquire().await?;
        write_ban(&mut conn, game_id, &activation).await?;
        Ok(activation.into_record(game_id.clone()))
    }

    async fn deactivate_ban(&self, game_id: &GameId) -> StoreResult<Option<BanRecord>> {
        let row = sqlx::query(&format!(
            "UPDATE bans SET active = 0 WHERE game_id = ? AND active = 1 RETURNING {BAN_COLUMNS}"
        ))
        .bind(game_id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(ban_row).transpose()
    }

    async fn list_active_bans(&self) -> StoreResult<Vec<BanRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {BAN_COLUMNS} FROM bans WHERE active = 1 ORDER BY ts DESC, game_id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(ban_row).collect()
    }
}
