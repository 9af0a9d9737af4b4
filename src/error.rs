//! Error types for the session engine
//!
//! Three families, kept apart so callers can react differently:
//!
//! - **Client errors**: bad move code, illegal move, strength out of range,
//!   finished game, unknown game. Nothing was written.
//! - **Corruption**: a stored move list that no longer replays. Fatal for the
//!   request; never reported as the client's fault.
//! - **Storage**: the persistence layer failed or lost a race.
//!
//! External move-generator failures never show up here; the opponent policy
//! recovers from them locally.

use crate::replay::ReplayError;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("game {id} not found")]
    GameNotFound { id: Uuid },

    #[error("game {id} is already finished")]
    GameFinished { id: Uuid },

    #[error("malformed move code: {code:?}")]
    MalformedMove { code: String },

    #[error("illegal move: {code}")]
    IllegalMove { code: String },

    #[error("strength must be between 0 and 10, got {value}")]
    StrengthOutOfRange { value: i64 },

    #[error("think time must be between 0 and 60000 ms, got {value}")]
    ThinkTimeOutOfRange { value: i64 },

    /// Another writer changed the game between read and write
    #[error("game {id} was modified concurrently")]
    Conflict { id: Uuid },

    /// The stored move list does not replay
    #[error("game {id} has a corrupt move list: {source}")]
    CorruptGame {
        id: Uuid,
        #[source]
        source: ReplayError,
    },

    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl SessionError {
    /// Machine-readable reason string
    pub fn reason(&self) -> &'static str {
        match self {
            SessionError::GameNotFound { .. } => "not_found",
            SessionError::GameFinished { .. } => "game_finished",
            SessionError::MalformedMove { .. } => "malformed_move",
            SessionError::IllegalMove { .. } => "illegal_move",
            SessionError::StrengthOutOfRange { .. } => "strength_out_of_range",
            SessionError::ThinkTimeOutOfRange { .. } => "think_time_out_of_range",
            SessionError::Conflict { .. } => "conflict",
            SessionError::CorruptGame { .. } => "corrupt_game",
            SessionError::Storage(StoreError::Corrupt { .. }) => "corrupt_game",
            SessionError::Storage(_) => "storage",
        }
    }

    /// True when the request itself was at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SessionError::GameNotFound { .. }
                | SessionError::GameFinished { .. }
                | SessionError::MalformedMove { .. }
                | SessionError::IllegalMove { .. }
                | SessionError::StrengthOutOfRange { .. }
                | SessionError::ThinkTimeOutOfRange { .. }
                | SessionError::Conflict { .. }
        )
    }

    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SessionError::CorruptGame { .. } | SessionError::Storage(StoreError::Corrupt { .. })
        )
    }
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => SessionError::GameNotFound { id },
            StoreError::Conflict { id } => SessionError::Conflict { id },
            other => SessionError::Storage(other),
        }
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
