//! Board selection state machine
//!
//! Turns "nothing selected" / "one square selected" into a classification of
//! all 64 squares for display. Pure and single-step: the selection comes from
//! the request, never from stored state.
//!
//! Without a selection a square is [`SquareFlavor::Blank`],
//! [`SquareFlavor::Selectable`] (the source of at least one legal move) or
//! [`SquareFlavor::NonMovablePiece`]. With a selection the selected square
//! becomes [`SquareFlavor::Selected`], other legal sources stay selectable, and
//! each destination of the selected piece becomes [`SquareFlavor::MoveHere`] or
//! [`SquareFlavor::CapturablePiece`].
//!
//! Squares are listed rank 8 to rank 1, file a to file h within a rank.

use crate::replay::Replay;
use chess_rules::{CastlingMode, Chess, File, Move, Piece, Position, Rank, Square, UciMove};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

/// Display class of one square
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SquareFlavor {
    Blank,
    NonMovablePiece,
    Selectable,
    Selected,
    MoveHere,
    CapturablePiece,
}

/// What clicking a square does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    None,
    /// Select this square
    Select,
    /// Clear the selection
    Deselect,
    /// Submit the move from the selected square to this one
    Move,
}

impl SquareFlavor {
    pub const ALL: [SquareFlavor; 6] = [
        SquareFlavor::Blank,
        SquareFlavor::NonMovablePiece,
        SquareFlavor::Selectable,
        SquareFlavor::Selected,
        SquareFlavor::MoveHere,
        SquareFlavor::CapturablePiece,
    ];

    pub fn affordance(self) -> Affordance {
        match self {
            SquareFlavor::Blank | SquareFlavor::NonMovablePiece => Affordance::None,
            SquareFlavor::Selectable => Affordance::Select,
            SquareFlavor::Selected => Affordance::Deselect,
            SquareFlavor::MoveHere | SquareFlavor::CapturablePiece => Affordance::Move,
        }
    }

    /// Extra css class on top of the square colour
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            SquareFlavor::Blank | SquareFlavor::NonMovablePiece => None,
            SquareFlavor::Selectable => Some("selectable"),
            SquareFlavor::Selected => Some("highlighted"),
            SquareFlavor::MoveHere => Some("move-here"),
            SquareFlavor::CapturablePiece => Some("capturable"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("square {square} has no legal move to select")]
    NotSelectable { square: Square },
}

/// One classified square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareView {
    pub square: Square,
    pub piece: Option<Piece>,
    pub flavor: SquareFlavor,
    /// Destination of the last move played
    pub last_move: bool,
}

impl SquareView {
    pub fn is_light(&self) -> bool {
        // a1 is dark
        (u32::from(self.square.rank()) + u32::from(self.square.file())) % 2 == 1
    }
}

/// All 64 squares in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub squares: Vec<SquareView>,
    pub selected: Option<Square>,
}

impl BoardView {
    /// Squares grouped by rank, rank 8 first
    pub fn rows(&self) -> impl Iterator<Item = &[SquareView]> {
        self.squares.chunks(8)
    }

    pub fn get(&self, square: Square) -> Option<&SquareView> {
        self.squares.iter().find(|view| view.square == square)
    }

    pub fn count(&self, flavor: SquareFlavor) -> usize {
        self.squares.iter().filter(|view| view.flavor == flavor).count()
    }
}

/// Squares in display order
pub fn display_order() -> impl Iterator<Item = Square> {
    Rank::ALL
        .into_iter()
        .rev()
        .flat_map(|rank| File::ALL.into_iter().map(move |file| Square::from_coords(file, rank)))
}

/// Square from zero-based rank and file indices, as used in board links
pub fn square_at(rank: u32, file: u32) -> Option<Square> {
    if rank < 8 && file < 8 {
        Some(Square::from_coords(File::new(file), Rank::new(rank)))
    } else {
        None
    }
}

/// Classify every square of `position`
pub fn board_view(position: &Chess, selected: Option<Square>) -> Result<BoardView, SelectionError> {
    let moves: Vec<Move> = position.legal_moves().into_iter().collect();
    classify(position, &moves, selected, None)
}

/// Classify the reconstructed game; a finished game has nothing selectable
pub fn replay_view(replay: &Replay, selected: Option<Square>) -> Result<BoardView, SelectionError> {
    let moves: Vec<Move> = if replay.is_terminal() {
        Vec::new()
    } else {
        replay.position.legal_moves().into_iter().collect()
    };
    let last = replay.last_move.as_ref().and_then(|m| endpoints(m).map(|(_, to)| to));
    classify(&replay.position, &moves, selected, last)
}

/// Source and destination as written in a move code
fn endpoints(m: &Move) -> Option<(Square, Square)> {
    match m.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => Some((from, to)),
        _ => None,
    }
}

fn classify(
    position: &Chess,
    moves: &[Move],
    selected: Option<Square>,
    last: Option<Square>,
) -> Result<BoardView, SelectionError> {
    let pairs: Vec<(Square, Square)> = moves.iter().filter_map(endpoints).collect();
    let sources: HashSet<Square> = pairs.iter().map(|(from, _)| *from).collect();

    if let Some(square) = selected {
        if !sources.contains(&square) {
            return Err(SelectionError::NotSelectable { square });
        }
    }
    let destinations: HashSet<Square> = pairs
        .iter()
        .filter(|(from, _)| Some(*from) == selected)
        .map(|(_, to)| *to)
        .collect();

    let board = position.board();
    let squares = display_order()
        .map(|square| {
            let piece = board.piece_at(square);
            let flavor = if Some(square) == selected {
                SquareFlavor::Selected
            } else if sources.contains(&square) {
                SquareFlavor::Selectable
            } else if destinations.contains(&square) {
                match piece {
                    Some(_) => SquareFlavor::CapturablePiece,
                    None => SquareFlavor::MoveHere,
                }
            } else if piece.is_some() {
                SquareFlavor::NonMovablePiece
            } else {
                SquareFlavor::Blank
            };
            SquareView {
                square,
                piece,
                flavor,
                last_move: piece.is_some() && Some(square) == last,
            }
        })
        .collect();

    Ok(BoardView { squares, selected })
}
