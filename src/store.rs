//! Move log store
//!
//! The persistence boundary for game records. The engine never caches state
//! across calls; every operation reads the record, derives what it needs and,
//! for a move, hands back one [`MoveCommit`].
//!
//! A commit writes the move list and the in-progress flag together and only
//! succeeds if the stored list still has the length the writer saw and the game
//! is still in progress. A losing writer gets [`StoreError::Conflict`] and
//! nothing is written, so no reader ever sees the move appended with a stale
//! flag or vice versa.

use crate::record::{GameRecord, Strength};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised by a [`GameStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("game {id} not found")]
    NotFound { id: Uuid },

    /// The expected move count or in-progress state no longer matches
    #[error("game {id} changed since it was read")]
    Conflict { id: Uuid },

    /// A stored row could not be decoded
    #[error("game {id} is unreadable: {detail}")]
    Corrupt { id: Uuid, detail: String },

    #[error("storage backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::Backend(Box::new(error))
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One validated move append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCommit {
    pub id: Uuid,
    /// Length of the move list the writer validated against
    pub expected_len: usize,
    /// The full new move list
    pub moves: Vec<String>,
    /// Flag value after the move
    pub in_progress: bool,
}

/// Persistence for game records
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert(&self, record: &GameRecord) -> StoreResult<()>;

    async fn fetch(&self, id: Uuid) -> StoreResult<GameRecord>;

    /// All games, newest first
    async fn list(&self) -> StoreResult<Vec<GameRecord>>;

    /// Overwrite the given settings; `None` leaves the stored value alone
    async fn update_settings(
        &self,
        id: Uuid,
        strength: Option<Strength>,
        think_time_ms: Option<u32>,
    ) -> StoreResult<GameRecord>;

    /// Atomically replace the move list and in-progress flag
    async fn commit_moves(&self, commit: &MoveCommit) -> StoreResult<GameRecord>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;
}

/// Serialize a move list for a text column
pub fn encode_moves(moves: &[String]) -> String {
    serde_json::Value::from(moves.to_vec()).to_string()
}

/// Decode a stored move list; a missing value means no moves
pub fn decode_moves(id: Uuid, raw: Option<&str>) -> StoreResult<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text).map_err(|e| StoreError::Corrupt {
            id,
            detail: e.to_string(),
        }),
    }
}

/// Process-local store for tests and tooling
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<Vec<GameRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.lock().is_empty()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn insert(&self, record: &GameRecord) -> StoreResult<()> {
        self.games.lock().push(record.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> StoreResult<GameRecord> {
        self.games
            .lock()
            .iter()
            .find(|game| game.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn list(&self) -> StoreResult<Vec<GameRecord>> {
        Ok(self.games.lock().iter().rev().cloned().collect())
    }

    async fn update_settings(
        &self,
        id: Uuid,
        strength: Option<Strength>,
        think_time_ms: Option<u32>,
    ) -> StoreResult<GameRecord> {
        let mut games = self.games.lock();
        let game = games
            .iter_mut()
            .find(|game| game.id == id)
            .ok_or(StoreError::NotFound { id })?;
        if let Some(strength) = strength {
            game.strength = strength;
        }
        if let Some(think_time_ms) = think_time_ms {
            game.think_time_ms = think_time_ms;
        }
        game.modified = Utc::now();
        Ok(game.clone())
    }

    async fn commit_moves(&self, commit: &MoveCommit) -> StoreResult<GameRecord> {
        let mut games = self.games.lock();
        let game = games
            .iter_mut()
            .find(|game| game.id == commit.id)
            .ok_or(StoreError::NotFound { id: commit.id })?;
        if game.moves.len() != commit.expected_len || !game.in_progress {
            return Err(StoreError::Conflict { id: commit.id });
        }
        game.moves = commit.moves.clone();
        game.in_progress = commit.in_progress;
        game.modified = Utc::now();
        Ok(game.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut games = self.games.lock();
        let before = games.len();
        games.retain(|game| game.id != id);
        if games.len() == before {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }
}
