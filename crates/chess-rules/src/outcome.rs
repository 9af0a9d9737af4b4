//! Terminal outcome descriptors
//!
//! Wraps the rules engine's notion of a finished game in a closed enum that the
//! session engine and the HTTP layer can match on exhaustively.

use shakmaty::Color;
use std::fmt;

/// Why a game ended without a winner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    /// 150 half-moves without a capture or pawn move
    SeventyFiveMoves,
    /// The same position occurred for the fifth time
    FivefoldRepetition,
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient material",
            DrawReason::SeventyFiveMoves => "the seventy-five-move rule",
            DrawReason::FivefoldRepetition => "fivefold repetition",
        };
        f.write_str(text)
    }
}

/// Result of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    /// Checkmate; `winner` is the side that delivered it
    Decisive { winner: Color },
    Draw { reason: DrawReason },
}

impl GameOutcome {
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::Decisive { winner } => Some(*winner),
            GameOutcome::Draw { .. } => None,
        }
    }

    /// Longer human-readable text, e.g. "White won by checkmate"
    pub fn description(&self) -> String {
        match self {
            GameOutcome::Decisive { .. } => format!("{self} by checkmate"),
            GameOutcome::Draw { reason } => format!("Draw by {reason}"),
        }
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Decisive {
                winner: Color::White,
            } => f.write_str("White won"),
            GameOutcome::Decisive {
                winner: Color::Black,
            } => f.write_str("Black won"),
            GameOutcome::Draw { .. } => f.write_str("Draw"),
        }
    }
}

/// Lower-case side name used on the wire ("white" / "black")
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}
