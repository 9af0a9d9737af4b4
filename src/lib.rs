//! Game session engine
//!
//! A game is an append-only log of move codes. Position, side to move and
//! outcome are replayed from that log on every read; a new move is validated
//! against the replayed position and committed together with the in-progress
//! flag in one write. The computer side replies through [`OpponentPolicy`],
//! which mixes an external move generator with random moves according to the
//! game's strength setting.

pub mod apply;
pub mod captured;
pub mod error;
pub mod names;
pub mod opponent;
pub mod promotion;
pub mod record;
pub mod replay;
pub mod selection;
pub mod session;
pub mod store;

pub use apply::{apply_move, plan_move, AppliedMove, PlannedMove};
pub use captured::CapturedPieces;
pub use error::{SessionError, SessionResult};
pub use opponent::{ChosenReply, OpponentPolicy, ReplySource};
pub use record::{GameRecord, Strength};
pub use replay::{reconstruct, Replay, ReplayError};
pub use selection::{board_view, replay_view, BoardView, SquareFlavor, SquareView};
pub use session::{GameSession, GameState, MoveReport, OpponentReply};
pub use store::{GameStore, MemoryStore, MoveCommit, StoreError, StoreResult};
