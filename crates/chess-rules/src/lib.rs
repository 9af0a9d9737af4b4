//! Chess rules adapter - the session engine's view of the rules of chess
//!
//! Legal-move generation, check/mate/stalemate detection and SAN/FEN text are
//! delegated to [`shakmaty`]. This crate narrows that library down to the small,
//! pure contract the session engine consumes:
//!
//! | Operation | Function |
//! |-----------|----------|
//! | start position | [`starting_position`] |
//! | parse a move code | [`from_code`] |
//! | bind a code to a position | [`resolve`] |
//! | apply a move | [`apply`] |
//! | legal moves | [`legal_moves`], [`legal_codes`] |
//! | terminal outcome | [`outcome`] |
//! | notation | [`to_notation`], [`to_code`], [`fen`] |
//!
//! Every function is synchronous and leaves its inputs untouched.
//!
//! Move codes are UCI long algebraic (`e2e4`, `e7e8q`). Castling is always written
//! with the king's destination (`e1g1`), never as king-takes-rook.

mod error;
mod outcome;

pub use error::{RulesError, RulesResult};
pub use outcome::{color_name, DrawReason, GameOutcome};

pub use shakmaty::uci::UciMove;
pub use shakmaty::{CastlingMode, Chess, Color, File, Move, MoveList, Piece, Position, Rank, Role, Square};

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::EnPassantMode;

/// Half-moves without capture or pawn move after which the game is drawn automatically
pub const SEVENTY_FIVE_MOVE_HALFMOVES: u32 = 150;

/// The canonical initial position, White to move
pub fn starting_position() -> Chess {
    Chess::default()
}

/// Build a position from FEN text
pub fn position_from_fen(fen: &str) -> RulesResult<Chess> {
    let setup: Fen = fen.parse().map_err(|_| RulesError::InvalidFen {
        fen: fen.to_string(),
    })?;
    setup
        .into_position(CastlingMode::Standard)
        .map_err(|_| RulesError::InvalidFen {
            fen: fen.to_string(),
        })
}

/// Parse a move code into a board move
///
/// Only from-square/to-square(/promotion) moves are accepted; the UCI null move
/// `0000` and piece drops are rejected as malformed.
pub fn from_code(code: &str) -> RulesResult<UciMove> {
    match code.trim().parse::<UciMove>() {
        Ok(uci @ UciMove::Normal { .. }) => Ok(uci),
        _ => Err(RulesError::Malformed {
            code: code.to_string(),
        }),
    }
}

/// Bind a parsed code to `position`, failing if it is not a legal move there
pub fn resolve(position: &Chess, uci: &UciMove) -> RulesResult<Move> {
    uci.to_move(position).map_err(|_| RulesError::Illegal {
        code: uci.to_string(),
    })
}

/// Play `m` on a copy of `position`
pub fn apply(position: &Chess, m: &Move) -> RulesResult<Chess> {
    position.clone().play(m).map_err(|_| RulesError::Illegal { code: to_code(m) })
}

pub fn legal_moves(position: &Chess) -> MoveList {
    position.legal_moves()
}

/// Legal moves as move codes, in the rules engine's generation order
pub fn legal_codes(position: &Chess) -> Vec<String> {
    position.legal_moves().iter().map(to_code).collect()
}

/// Move code for `m` (standard castling notation)
pub fn to_code(m: &Move) -> String {
    m.to_uci(CastlingMode::Standard).to_string()
}

/// Standard algebraic notation for `m` played in `position`, with `+`/`#` suffix
pub fn to_notation(position: &Chess, m: &Move) -> String {
    SanPlus::from_move(position.clone(), m).to_string()
}

pub fn fen(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

/// Identity of a position for repetition counting: placement, side to move,
/// castling rights and a capturable en-passant square. Clocks are ignored.
pub fn repetition_key(position: &Chess) -> String {
    fen(position)
        .split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Terminal outcome that can be read off `position` alone
///
/// Repetition needs the game's history and is handled by the caller.
pub fn outcome(position: &Chess) -> Option<GameOutcome> {
    if position.is_checkmate() {
        return Some(GameOutcome::Decisive {
            winner: position.turn().other(),
        });
    }
    let reason = if position.is_stalemate() {
        DrawReason::Stalemate
    } else if position.is_insufficient_material() {
        DrawReason::InsufficientMaterial
    } else if position.halfmoves() >= SEVENTY_FIVE_MOVE_HALFMOVES {
        DrawReason::SeventyFiveMoves
    } else {
        return None;
    };
    Some(GameOutcome::Draw { reason })
}
