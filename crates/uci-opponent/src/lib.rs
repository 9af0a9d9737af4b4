//! External move generator for the computer opponent
//!
//! The opponent policy asks an external chess program for a move when its
//! strength setting says so. That program may not exist on a given machine, so
//! the capability sits behind the [`MoveGenerator`] trait with two
//! implementations:
//!
//! - [`UciEngine`]: spawns a UCI program (Stockfish, GNU Chess in `--uci` mode)
//!   per request and reads back its `bestmove`
//! - [`AbsentGenerator`]: no program was found; every request fails
//!
//! [`discover`] picks one of the two once at process start. Callers never see
//! subprocess details and treat any [`GeneratorError`] as "fall back to a random
//! move".

mod absent;
mod discovery;
mod error;
mod uci;

pub use absent::AbsentGenerator;
pub use discovery::{discover, EngineCommand, DEFAULT_CANDIDATES};
pub use error::{GeneratorError, GeneratorResult};
pub use uci::{parse_bestmove, UciEngine};

use async_trait::async_trait;
use std::time::Duration;

/// One request for a move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Position to search, as FEN
    pub fen: String,
    /// Thinking time handed to the program; zero means "best immediate guess"
    pub think_time: Duration,
}

impl SearchRequest {
    pub fn new(fen: impl Into<String>, think_time: Duration) -> Self {
        Self {
            fen: fen.into(),
            think_time,
        }
    }
}

/// A source of strong moves
///
/// `Ok(None)` is the program's explicit "no move" answer and is distinct from
/// resignation or failure.
#[async_trait]
pub trait MoveGenerator: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    /// Whether requests can succeed at all on this deployment
    fn is_available(&self) -> bool;

    /// Ask for the best move in `request.fen`, returned as a move code
    async fn best_move(&self, request: &SearchRequest) -> GeneratorResult<Option<String>>;
}
