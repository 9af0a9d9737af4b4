//! Error types for the rules adapter

use thiserror::Error;

/// Errors raised when a move code or position cannot be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The text is not a structurally valid board move (e.g. `"invalid"`, `"0000"`)
    #[error("malformed move code: {code:?}")]
    Malformed { code: String },

    /// The move parses but is not legal in the position it was played in
    #[error("illegal move in this position: {code}")]
    Illegal { code: String },

    /// FEN text could not be turned into a legal standard-chess position
    #[error("invalid FEN: {fen}")]
    InvalidFen { fen: String },
}

/// Result type alias for rules operations
pub type RulesResult<T> = Result<T, RulesError>;
