//! Promotion normalizer
//!
//! Raw move codes from a board click carry only source and destination, so a
//! pawn reaching the last rank arrives as `a7a8` with no promotion piece. The
//! rules engine treats that as illegal. Such moves are rewritten to promote to
//! a queen before they reach the rules engine.
//!
//! The "pawn arriving on its promotion rank" check is recomputed here from the
//! position itself and mirrors the rules engine's own pseudo-legality rule for
//! promotion squares. An explicit promotion (`a7a8n`) is never touched.

use chess_rules::{Chess, Color, Position, Rank, Role, Square, UciMove};

/// Whether moving the piece on `from` to `to` is a pawn arriving on the last
/// rank for the side to move
pub fn is_promotion_arrival(position: &Chess, from: Square, to: Square) -> bool {
    let is_pawn = position
        .board()
        .piece_at(from)
        .is_some_and(|piece| piece.role == Role::Pawn);
    let last_rank = match position.turn() {
        Color::White => Rank::Eighth,
        Color::Black => Rank::First,
    };
    is_pawn && to.rank() == last_rank
}

/// Apply the queen default to a candidate move
pub fn normalize(position: &Chess, candidate: UciMove) -> UciMove {
    match candidate {
        UciMove::Normal {
            from,
            to,
            promotion: None,
        } if is_promotion_arrival(position, from, to) => UciMove::Normal {
            from,
            to,
            promotion: Some(Role::Queen),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_rules::{apply, from_code, position_from_fen, resolve, Piece};

    const WHITE_TO_PROMOTE: &str = "4k3/P7/8/8/8/8/7p/4K3 w - - 0 1";
    const BLACK_TO_PROMOTE: &str = "4k3/P7/8/8/8/8/7p/4K3 b - - 0 1";

    fn push(position: &Chess, code: &str) -> Chess {
        let candidate = normalize(position, from_code(code).unwrap());
        let m = resolve(position, &candidate).expect("normalized move is legal");
        apply(position, &m).unwrap()
    }

    #[test]
    fn test_white_pawn_defaults_to_queen() {
        let position = position_from_fen(WHITE_TO_PROMOTE).unwrap();
        let normalized = normalize(&position, from_code("a7a8").unwrap());
        assert_eq!(normalized.to_string(), "a7a8q");

        let after = push(&position, "a7a8");
        assert_eq!(
            after.board().piece_at(Square::A8),
            Some(Piece {
                color: Color::White,
                role: Role::Queen
            })
        );
    }

    #[test]
    fn test_black_pawn_defaults_to_queen() {
        let position = position_from_fen(BLACK_TO_PROMOTE).unwrap();
        let after = push(&position, "h2h1");
        assert_eq!(
            after.board().piece_at(Square::H1),
            Some(Piece {
                color: Color::Black,
                role: Role::Queen
            })
        );
    }

    #[test]
    fn test_explicit_underpromotion_is_kept() {
        let position = position_from_fen(WHITE_TO_PROMOTE).unwrap();
        let normalized = normalize(&position, from_code("a7a8n").unwrap());
        assert_eq!(normalized.to_string(), "a7a8n");

        let after = push(&position, "a7a8r");
        assert_eq!(
            after.board().piece_at(Square::A8).map(|p| p.role),
            Some(Role::Rook)
        );
    }

    #[test]
    fn test_non_pawn_on_back_rank_is_untouched() {
        let position = position_from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let normalized = normalize(&position, from_code("a1a8").unwrap());
        assert_eq!(normalized.to_string(), "a1a8");
    }

    #[test]
    fn test_ordinary_pawn_push_is_untouched() {
        let position = chess_rules::starting_position();
        let normalized = normalize(&position, from_code("e2e4").unwrap());
        assert_eq!(normalized.to_string(), "e2e4");
        assert!(!is_promotion_arrival(&position, Square::E2, Square::E4));
    }

    #[test]
    fn test_predicate_uses_side_to_move() {
        // a White pawn "arriving" on rank 1 is not a promotion for White
        let position = position_from_fen(WHITE_TO_PROMOTE).unwrap();
        assert!(is_promotion_arrival(&position, Square::A7, Square::A8));
        assert!(!is_promotion_arrival(&position, Square::H2, Square::H1));
    }
}
