//! Game record - the persisted per-game move log
//!
//! The ordered list of move codes is the only authoritative game state.
//! Position, side to move and outcome are recomputed from it on every read
//! (see [`crate::replay`]); the record only carries what cannot be derived:
//! identity, name, the opponent settings and the in-progress flag.
//!
//! # Lifecycle
//!
//! - Created with an empty move list, `in_progress == true`
//! - Moves are only ever appended, one per Move Application, as a whole-list write
//! - `in_progress` flips to false once, when a move ends the game, and never back
//! - Strength and think time may be changed at any time

use crate::error::{SessionError, SessionResult};
use chess_rules::Color;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// Default thinking time handed to the external move generator
pub const DEFAULT_THINK_TIME_MS: u32 = 1;

/// Upper bound accepted for the per-move thinking time
pub const MAX_THINK_TIME_MS: u32 = 60_000;

/// Opponent strength, 0 (always random) through 10 (always consult the engine)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Strength(u8);

impl Strength {
    pub const MIN: Strength = Strength(0);
    pub const MAX: Strength = Strength(10);

    /// Validate a raw value
    pub fn new(value: i64) -> SessionResult<Self> {
        if (i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&value) {
            Ok(Strength(value as u8))
        } else {
            Err(SessionError::StrengthOutOfRange { value })
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Default for Strength {
    fn default() -> Self {
        Strength::MAX
    }
}

/// Validate a raw think-time value in milliseconds
pub fn think_time_ms(value: i64) -> SessionResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|ms| *ms <= MAX_THINK_TIME_MS)
        .ok_or(SessionError::ThinkTimeOutOfRange { value })
}

/// Side to move after `move_count` half-moves: White on even counts, Black on odd
pub fn side_to_move(move_count: usize) -> Color {
    if move_count % 2 == 0 {
        Color::White
    } else {
        Color::Black
    }
}

/// One persisted game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: Uuid,
    /// Human-readable name, assigned once at creation
    pub name: String,
    /// Move codes in play order
    pub moves: Vec<String>,
    pub in_progress: bool,
    pub strength: Strength,
    pub think_time_ms: u32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl GameRecord {
    /// A fresh game with no moves played
    pub fn new(name: impl Into<String>, strength: Strength) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            moves: Vec::new(),
            in_progress: true,
            strength,
            think_time_ms: DEFAULT_THINK_TIME_MS,
            created: now,
            modified: now,
        }
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn side_to_move(&self) -> Color {
        side_to_move(self.moves.len())
    }

    /// Number of half-moves `side` has already played
    pub fn halfmoves_played_by(&self, side: Color) -> usize {
        match side {
            Color::White => (self.moves.len() + 1) / 2,
            Color::Black => self.moves.len() / 2,
        }
    }

    pub fn think_time(&self) -> Duration {
        Duration::from_millis(u64::from(self.think_time_ms))
    }
}
