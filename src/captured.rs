//! Captured pieces summary
//!
//! Built while replaying a game: every move that removes an enemy piece (en
//! passant included) credits the capturing side. Used for the game detail view
//! and the material balance shown next to the board.
//!
//! # Material Values
//!
//! Standard chess piece values in pawns:
//! - Pawn: 1
//! - Knight/Bishop: 3
//! - Rook: 5
//! - Queen: 9
//! - King: 0 (cannot be captured)

use chess_rules::{Color, Piece, Role};

/// Pieces captured by each side, in capture order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    /// Black pieces that White has captured
    pub white_captured: Vec<Role>,
    /// White pieces that Black has captured
    pub black_captured: Vec<Role>,
}

impl CapturedPieces {
    /// Record that `captured_piece_color` lost a piece of `role`
    pub fn add_capture(&mut self, captured_piece_color: Color, role: Role) {
        match captured_piece_color {
            // White piece lost, Black gets credit
            Color::White => self.black_captured.push(role),
            Color::Black => self.white_captured.push(role),
        }
    }

    /// Material difference in pawns; positive when White is ahead
    pub fn material_advantage(&self) -> i32 {
        let white_score: i32 = self.white_captured.iter().map(|r| piece_value(*r)).sum();
        let black_score: i32 = self.black_captured.iter().map(|r| piece_value(*r)).sum();
        white_score - black_score
    }

    /// Piece letters of the pieces `capturer` took, e.g. `["p", "n"]` for White
    pub fn symbols(&self, capturer: Color) -> Vec<String> {
        let (roles, victim) = match capturer {
            Color::White => (&self.white_captured, Color::Black),
            Color::Black => (&self.black_captured, Color::White),
        };
        roles
            .iter()
            .map(|role| {
                Piece {
                    color: victim,
                    role: *role,
                }
                .char()
                .to_string()
            })
            .collect()
    }
}

fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 3,
        Role::Bishop => 3,
        Role::Rook => 5,
        Role::Queen => 9,
        Role::King => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_pieces_default() {
        let captured = CapturedPieces::default();
        assert!(captured.white_captured.is_empty());
        assert!(captured.black_captured.is_empty());
        assert_eq!(captured.material_advantage(), 0);
    }

    #[test]
    fn test_add_capture_credits_the_capturer() {
        let mut captured = CapturedPieces::default();
        captured.add_capture(Color::Black, Role::Queen);
        assert_eq!(captured.white_captured, vec![Role::Queen]);
        assert!(captured.black_captured.is_empty());
        assert_eq!(captured.material_advantage(), 9);
    }

    #[test]
    fn test_material_advantage_nets_both_sides() {
        let mut captured = CapturedPieces::default();
        captured.add_capture(Color::Black, Role::Rook);
        captured.add_capture(Color::Black, Role::Pawn);
        captured.add_capture(Color::White, Role::Knight);
        assert_eq!(captured.material_advantage(), 3);
    }

    #[test]
    fn test_symbols_use_victim_colour() {
        let mut captured = CapturedPieces::default();
        captured.add_capture(Color::Black, Role::Pawn);
        captured.add_capture(Color::White, Role::Bishop);
        assert_eq!(captured.symbols(Color::White), vec!["p".to_string()]);
        assert_eq!(captured.symbols(Color::Black), vec!["B".to_string()]);
    }
}
