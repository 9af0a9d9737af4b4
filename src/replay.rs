//! Board reconstruction
//!
//! Replays a stored move list from the start position through the rules
//! engine and returns everything the rest of the system derives from it:
//! current position, side to move, per-move notation, captured pieces and the
//! terminal outcome, if any.
//!
//! Replaying is pure. Calling [`reconstruct`] twice on the same list yields
//! identical results, and it may run concurrently on shared input.
//!
//! A stored move that fails to replay means the persisted game is corrupt.
//! That is reported as a [`ReplayError`], never as a bad request.

use crate::captured::CapturedPieces;
use crate::promotion;
use chess_rules::{
    Chess, Color, DrawReason, GameOutcome, Move, Position, RulesError,
};
use std::collections::HashMap;
use thiserror::Error;

/// Occurrences of one position that end the game automatically
pub const FIVEFOLD: u32 = 5;

/// A stored move that does not replay
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stored move #{index} ({code:?}) does not replay: {source}")]
pub struct ReplayError {
    /// Zero-based position of the move in the stored list
    pub index: usize,
    pub code: String,
    #[source]
    pub source: RulesError,
}

/// Everything derived from a move list
#[derive(Debug, Clone)]
pub struct Replay {
    pub position: Chess,
    /// Move codes as replayed (queen default applied)
    pub codes: Vec<String>,
    /// Notation for each move, in order
    pub san: Vec<String>,
    pub captured: CapturedPieces,
    pub outcome: Option<GameOutcome>,
    pub last_move: Option<Move>,
}

impl Replay {
    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Legal move codes; empty once the game is over
    pub fn legal_codes(&self) -> Vec<String> {
        if self.is_terminal() {
            Vec::new()
        } else {
            chess_rules::legal_codes(&self.position)
        }
    }

    pub fn fen(&self) -> String {
        chess_rules::fen(&self.position)
    }
}

/// Replay `moves` from the standard start position
pub fn reconstruct<S: AsRef<str>>(moves: &[S]) -> Result<Replay, ReplayError> {
    let mut position = chess_rules::starting_position();
    let mut codes = Vec::with_capacity(moves.len());
    let mut san = Vec::with_capacity(moves.len());
    let mut captured = CapturedPieces::default();
    let mut last_move = None;

    let mut seen: HashMap<String, u32> = HashMap::new();
    seen.insert(chess_rules::repetition_key(&position), 1);
    let mut repetitions = 1;

    for (index, code) in moves.iter().enumerate() {
        let code = code.as_ref();
        let fail = |source: RulesError| ReplayError {
            index,
            code: code.to_string(),
            source,
        };

        let candidate = chess_rules::from_code(code).map_err(fail)?;
        let candidate = promotion::normalize(&position, candidate);
        let m = chess_rules::resolve(&position, &candidate).map_err(fail)?;

        san.push(chess_rules::to_notation(&position, &m));
        codes.push(chess_rules::to_code(&m));
        if let Some(role) = m.capture() {
            captured.add_capture(position.turn().other(), role);
        }

        position = chess_rules::apply(&position, &m).map_err(fail)?;
        let count = seen
            .entry(chess_rules::repetition_key(&position))
            .or_insert(0);
        *count += 1;
        repetitions = *count;
        last_move = Some(m);
    }

    let outcome = chess_rules::outcome(&position).or_else(|| {
        (repetitions >= FIVEFOLD).then_some(GameOutcome::Draw {
            reason: DrawReason::FivefoldRepetition,
        })
    });

    Ok(Replay {
        position,
        codes,
        san,
        captured,
        outcome,
        last_move,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{Piece, Role, Square};

    const SCHOLARS_MATE: [&str; 7] = ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"];

    #[test]
    fn test_empty_list_is_start_position() {
        let replay = reconstruct::<String>(&[]).unwrap();
        assert_eq!(replay.turn(), Color::White);
        assert!(replay.san.is_empty());
        assert!(replay.outcome.is_none());
        assert!(replay.last_move.is_none());
        assert_eq!(replay.legal_codes().len(), 20);
    }

    #[test]
    fn test_capture_leaves_origin_squares_empty() {
        let replay = reconstruct(&["e2e4", "d7d5", "e4d5"]).unwrap();
        let board = replay.position.board();
        assert_eq!(
            board.piece_at(Square::D5),
            Some(Piece {
                color: Color::White,
                role: Role::Pawn
            })
        );
        assert_eq!(board.piece_at(Square::E4), None);
        assert_eq!(board.piece_at(Square::E2), None);
        assert_eq!(board.piece_at(Square::D7), None);
        assert_eq!(replay.san, vec!["e4", "d5", "exd5"]);
        assert_eq!(replay.captured.white_captured, vec![Role::Pawn]);
    }

    #[test]
    fn test_en_passant_capture() {
        let replay = reconstruct(&["e2e4", "d7d5", "e4e5", "f7f5", "e5f6"]).unwrap();
        let board = replay.position.board();
        assert_eq!(
            board.piece_at(Square::F6),
            Some(Piece {
                color: Color::White,
                role: Role::Pawn
            })
        );
        assert_eq!(board.piece_at(Square::F5), None);
        assert_eq!(board.piece_at(Square::E5), None);
        assert_eq!(replay.captured.white_captured, vec![Role::Pawn]);
    }

    #[test]
    fn test_scholars_mate_is_terminal() {
        let replay = reconstruct(&SCHOLARS_MATE).unwrap();
        assert_eq!(
            replay.outcome,
            Some(GameOutcome::Decisive {
                winner: Color::White
            })
        );
        assert!(replay.legal_codes().is_empty());
        assert_eq!(replay.san.last().map(String::as_str), Some("Qxf7#"));
    }

    #[test]
    fn test_reconstruct_is_deterministic() {
        let a = reconstruct(&SCHOLARS_MATE).unwrap();
        let b = reconstruct(&SCHOLARS_MATE).unwrap();
        assert_eq!(a.fen(), b.fen());
        assert_eq!(a.san, b.san);
        assert_eq!(a.codes, b.codes);
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.captured, b.captured);
    }

    #[test]
    fn test_corrupt_list_reports_index() {
        let error = reconstruct(&["e2e4", "e7e5", "e4e5"]).unwrap_err();
        assert_eq!(error.index, 2);
        assert_eq!(error.code, "e4e5");
        assert!(matches!(error.source, RulesError::Illegal { .. }));

        let error = reconstruct(&["e2e4", "garbage"]).unwrap_err();
        assert_eq!(error.index, 1);
        assert!(matches!(error.source, RulesError::Malformed { .. }));
    }

    #[test]
    fn test_legacy_promotion_without_piece_replays_as_queen() {
        let moves = [
            "a2a4", "h7h5", "a4a5", "h5h4", "a5a6", "h4h3", "a6b7", "h3g2", "b7a8", "g2h1",
        ];
        let replay = reconstruct(&moves).unwrap();
        assert_eq!(replay.codes[8], "b7a8q");
        assert_eq!(replay.codes[9], "g2h1q");
        let board = replay.position.board();
        assert_eq!(
            board.piece_at(Square::A8),
            Some(Piece {
                color: Color::White,
                role: Role::Queen
            })
        );
        assert_eq!(
            board.piece_at(Square::H1),
            Some(Piece {
                color: Color::Black,
                role: Role::Queen
            })
        );
    }

    #[test]
    fn test_fivefold_repetition_ends_game() {
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        let four_cycles: Vec<&str> = shuffle.iter().cycle().take(16).copied().collect();
        let replay = reconstruct(&four_cycles).unwrap();
        assert_eq!(
            replay.outcome,
            Some(GameOutcome::Draw {
                reason: DrawReason::FivefoldRepetition
            })
        );

        let three_cycles: Vec<&str> = shuffle.iter().cycle().take(12).copied().collect();
        assert!(reconstruct(&three_cycles).unwrap().outcome.is_none());
    }
}
