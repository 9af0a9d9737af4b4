//! Move application
//!
//! Validates one candidate move against a game's current position and turns it
//! into a single [`MoveCommit`]. Validation happens entirely before anything is
//! written: a rejected move leaves the stored game untouched.
//!
//! The pipeline is the same for human moves and opponent replies:
//!
//! 1. refuse finished games
//! 2. parse the code
//! 3. reconstruct the position and apply the queen default
//! 4. require membership in the legal-move set
//! 5. recompute the outcome on the new move list and commit moves + flag together

use crate::error::{SessionError, SessionResult};
use crate::promotion;
use crate::record::GameRecord;
use crate::replay::{self, Replay};
use crate::store::{GameStore, MoveCommit};
use chess_rules::{GameOutcome, RulesError};
use tracing::{debug, info};

/// A validated move, ready to be committed
#[derive(Debug, Clone)]
pub struct PlannedMove {
    /// Canonical code of the move as stored (promotion piece filled in)
    pub code: String,
    pub san: String,
    pub commit: MoveCommit,
    pub outcome: Option<GameOutcome>,
}

/// Result of a committed move
#[derive(Debug, Clone)]
pub struct AppliedMove {
    pub code: String,
    pub san: String,
    pub outcome: Option<GameOutcome>,
    /// The record as stored after the commit
    pub record: GameRecord,
}

/// Replay a record, mapping failure to data corruption
pub fn replay_record(record: &GameRecord) -> SessionResult<Replay> {
    replay::reconstruct(&record.moves).map_err(|source| SessionError::CorruptGame {
        id: record.id,
        source,
    })
}

/// Validate `code` against `record` without writing anything
pub fn plan_move(record: &GameRecord, code: &str) -> SessionResult<PlannedMove> {
    if !record.in_progress {
        return Err(SessionError::GameFinished { id: record.id });
    }

    let candidate = chess_rules::from_code(code).map_err(|_| SessionError::MalformedMove {
        code: code.to_string(),
    })?;

    let current = replay_record(record)?;
    if current.is_terminal() {
        // flag and log disagree; the log wins
        return Err(SessionError::GameFinished { id: record.id });
    }

    let candidate = promotion::normalize(&current.position, candidate);
    let m = chess_rules::resolve(&current.position, &candidate).map_err(|e| match e {
        RulesError::Malformed { .. } => SessionError::MalformedMove {
            code: code.to_string(),
        },
        _ => SessionError::IllegalMove {
            code: code.to_string(),
        },
    })?;

    let applied = chess_rules::to_code(&m);
    let san = chess_rules::to_notation(&current.position, &m);

    let mut moves = record.moves.clone();
    moves.push(applied.clone());
    let after = replay::reconstruct(&moves).map_err(|source| SessionError::CorruptGame {
        id: record.id,
        source,
    })?;

    Ok(PlannedMove {
        code: applied,
        san,
        commit: MoveCommit {
            id: record.id,
            expected_len: record.moves.len(),
            moves,
            in_progress: !after.is_terminal(),
        },
        outcome: after.outcome,
    })
}

/// Validate and persist one move
pub async fn apply_move(
    store: &dyn GameStore,
    record: &GameRecord,
    code: &str,
) -> SessionResult<AppliedMove> {
    let plan = plan_move(record, code)?;
    debug!(
        "[SESSION] Committing {} ({}) to game {} at move {}",
        plan.code, plan.san, record.id, plan.commit.expected_len
    );

    let stored = store.commit_moves(&plan.commit).await?;

    if let Some(outcome) = plan.outcome {
        info!(
            "[SESSION] Game {} finished after {}: {}",
            stored.id,
            plan.san,
            outcome.description()
        );
    }

    Ok(AppliedMove {
        code: plan.code,
        san: plan.san,
        outcome: plan.outcome,
        record: stored,
    })
}
