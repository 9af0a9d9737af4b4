//! SQLite game store
//!
//! Runtime `sqlx` queries against one `games` table. The move list lives in a
//! JSON text column next to a `move_count` column; the count is what makes the
//! move commit a single guarded `UPDATE`.

use async_trait::async_trait;
use chess_session::store::{decode_moves, encode_moves};
use chess_session::{GameRecord, GameStore, MoveCommit, StoreError, StoreResult, Strength};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS games (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    moves TEXT,
    move_count INTEGER NOT NULL DEFAULT 0,
    in_progress INTEGER NOT NULL DEFAULT 1,
    black_smartness INTEGER NOT NULL DEFAULT 10,
    think_time_ms INTEGER NOT NULL DEFAULT 1,
    created TEXT NOT NULL,
    modified TEXT NOT NULL
);";

const COLUMNS: &str =
    "id, name, moves, in_progress, black_smartness, think_time_ms, created, modified";

#[derive(Clone, Debug)]
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url`
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::backend)?
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(StoreError::backend)?;
        info!("[STORE] Connected to {}", url);
        Self::with_pool(db).await
    }

    /// Wrap an existing pool and make sure the schema exists
    pub async fn with_pool(db: Pool<Sqlite>) -> StoreResult<Self> {
        sqlx::query(SCHEMA)
            .execute(&db)
            .await
            .map_err(StoreError::backend)?;
        Ok(Self { db })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.db
    }

    async fn exists(&self, id: Uuid) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM games WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.is_some())
    }
}

fn record_from_row(row: &SqliteRow) -> StoreResult<GameRecord> {
    let raw_id: String = row.try_get("id").map_err(StoreError::backend)?;
    let id = Uuid::parse_str(&raw_id).map_err(|e| StoreError::Corrupt {
        id: Uuid::nil(),
        detail: format!("bad id {raw_id:?}: {e}"),
    })?;
    let corrupt = |detail: String| StoreError::Corrupt { id, detail };

    let moves: Option<String> = row.try_get("moves").map_err(StoreError::backend)?;
    let strength: i64 = row.try_get("black_smartness").map_err(StoreError::backend)?;
    let think_time_ms: i64 = row.try_get("think_time_ms").map_err(StoreError::backend)?;
    let created: DateTime<Utc> = row.try_get("created").map_err(StoreError::backend)?;
    let modified: DateTime<Utc> = row.try_get("modified").map_err(StoreError::backend)?;

    Ok(GameRecord {
        id,
        name: row.try_get("name").map_err(StoreError::backend)?,
        moves: decode_moves(id, moves.as_deref())?,
        in_progress: row.try_get("in_progress").map_err(StoreError::backend)?,
        strength: Strength::new(strength).map_err(|e| corrupt(e.to_string()))?,
        think_time_ms: u32::try_from(think_time_ms).map_err(|e| corrupt(e.to_string()))?,
        created,
        modified,
    })
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn insert(&self, record: &GameRecord) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO games (id, name, moves, move_count, in_progress, black_smartness, think_time_ms, created, modified)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.name)
        .bind(encode_moves(&record.moves))
        .bind(record.moves.len() as i64)
        .bind(record.in_progress)
        .bind(i64::from(record.strength.get()))
        .bind(i64::from(record.think_time_ms))
        .bind(record.created)
        .bind(record.modified)
        .execute(&self.db)
        .await
        .map_err(StoreError::backend)?;
        debug!("[STORE] Inserted game {}", record.id);
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> StoreResult<GameRecord> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM games WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::NotFound { id })?;
        record_from_row(&row)
    }

    async fn list(&self) -> StoreResult<Vec<GameRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM games ORDER BY created DESC, rowid DESC"
        ))
        .fetch_all(&self.db)
        .await
        .map_err(StoreError::backend)?;
        rows.iter().map(record_from_row).collect()
    }

    async fn update_settings(
        &self,
        id: Uuid,
        strength: Option<Strength>,
        think_time_ms: Option<u32>,
    ) -> StoreResult<GameRecord> {
        let result = sqlx::query(
            "UPDATE games SET black_smartness = COALESCE(?, black_smartness),
             think_time_ms = COALESCE(?, think_time_ms), modified = ? WHERE id = ?",
        )
        .bind(strength.map(|s| i64::from(s.get())))
        .bind(think_time_ms.map(i64::from))
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.db)
        .await
        .map_err(StoreError::backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        self.fetch(id).await
    }

    async fn commit_moves(&self, commit: &MoveCommit) -> StoreResult<GameRecord> {
        let result = sqlx::query(
            "UPDATE games SET moves = ?, move_count = ?, in_progress = ?, modified = ?
             WHERE id = ? AND move_count = ? AND in_progress = 1",
        )
        .bind(encode_moves(&commit.moves))
        .bind(commit.moves.len() as i64)
        .bind(commit.in_progress)
        .bind(Utc::now())
        .bind(commit.id.to_string())
        .bind(commit.expected_len as i64)
        .execute(&self.db)
        .await
        .map_err(StoreError::backend)?;

        if result.rows_affected() == 0 {
            return Err(if self.exists(commit.id).await? {
                StoreError::Conflict { id: commit.id }
            } else {
                StoreError::NotFound { id: commit.id }
            });
        }
        debug!(
            "[STORE] Game {} now has {} moves (in progress: {})",
            commit.id,
            commit.moves.len(),
            commit.in_progress
        );
        self.fetch(commit.id).await
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.db)
            .await
            .map_err(StoreError::backend)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }
}
