//! Game session orchestrator
//!
//! Composes the store and the opponent policy into the operations the HTTP
//! layer and the maintenance tooling call. Each operation reads the record,
//! derives state from the move log and writes at most one commit per applied
//! move; nothing is cached between calls.
//!
//! A human move runs:
//!
//! ```text
//! fetch -> apply_move (human) -> policy due? -> choose_reply -> apply_move (reply) -> replay
//! ```

use crate::apply::{apply_move, replay_record, AppliedMove};
use crate::error::SessionResult;
use crate::names::generate_game_name;
use crate::opponent::{OpponentPolicy, ReplySource};
use crate::record::{think_time_ms, GameRecord, Strength};
use crate::replay::Replay;
use crate::store::GameStore;
use chess_rules::{Color, GameOutcome};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A record together with everything derived from its move log
#[derive(Debug, Clone)]
pub struct GameState {
    pub record: GameRecord,
    pub replay: Replay,
}

impl GameState {
    pub fn from_record(record: GameRecord) -> SessionResult<Self> {
        let replay = replay_record(&record)?;
        Ok(Self { record, replay })
    }

    pub fn id(&self) -> Uuid {
        self.record.id
    }

    /// Side to move; `None` once the game is over
    pub fn whose_turn(&self) -> Option<Color> {
        (self.record.in_progress && !self.replay.is_terminal()).then(|| self.replay.turn())
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.replay.outcome
    }

    /// Legal move codes; empty unless the game is in progress
    pub fn legal_codes(&self) -> Vec<String> {
        if self.record.in_progress {
            self.replay.legal_codes()
        } else {
            Vec::new()
        }
    }
}

/// The opponent's applied reply
#[derive(Debug, Clone)]
pub struct OpponentReply {
    pub applied: AppliedMove,
    pub source: ReplySource,
}

/// Outcome of [`GameSession::play_move`]
#[derive(Debug, Clone)]
pub struct MoveReport {
    pub move_made: AppliedMove,
    /// `None` when no reply was due or it could not be applied
    pub reply: Option<OpponentReply>,
    pub state: GameState,
}

pub struct GameSession {
    store: Arc<dyn GameStore>,
    policy: OpponentPolicy,
}

impl GameSession {
    pub fn new(store: Arc<dyn GameStore>, policy: OpponentPolicy) -> Self {
        info!(
            "[SESSION] Opponent plays {:?} using {}",
            policy.side(),
            policy.generator_name()
        );
        Self { store, policy }
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub fn policy(&self) -> &OpponentPolicy {
        &self.policy
    }

    pub async fn create_game(&self, strength: Strength) -> SessionResult<GameState> {
        let name = generate_game_name(&mut rand::rng());
        let record = GameRecord::new(name, strength);
        self.store.insert(&record).await?;
        info!(
            "[SESSION] Created game {} ({}), strength {}",
            record.id,
            record.name,
            strength.get()
        );
        GameState::from_record(record)
    }

    pub async fn game(&self, id: Uuid) -> SessionResult<GameState> {
        let record = self.store.fetch(id).await?;
        GameState::from_record(record)
    }

    /// All games, newest first
    pub async fn list_games(&self) -> SessionResult<Vec<GameState>> {
        self.store
            .list()
            .await?
            .into_iter()
            .map(GameState::from_record)
            .collect()
    }

    /// Apply a human move, then the opponent's reply if one is due
    ///
    /// Once the human move is committed the call succeeds. A reply that fails
    /// to apply is logged and reported as `None`; the game is left waiting on
    /// the opponent for `reply_if_due` to pick up.
    pub async fn play_move(&self, id: Uuid, code: &str) -> SessionResult<MoveReport> {
        let record = self.store.fetch(id).await?;
        let move_made = apply_move(self.store.as_ref(), &record, code).await?;
        debug!("[SESSION] Game {}: human played {}", id, move_made.san);

        let reply = match self.reply_to(&move_made.record).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("[SESSION] Game {}: reply not applied: {}", id, e);
                None
            }
        };
        let latest = match &reply {
            Some(reply) => reply.applied.record.clone(),
            None => move_made.record.clone(),
        };

        Ok(MoveReport {
            move_made,
            reply,
            state: GameState::from_record(latest)?,
        })
    }

    /// Change strength and/or think time; `None` keeps the stored value
    pub async fn update_settings(
        &self,
        id: Uuid,
        strength: Option<i64>,
        think_time: Option<i64>,
    ) -> SessionResult<GameState> {
        let strength = strength.map(Strength::new).transpose()?;
        let think_time = think_time.map(think_time_ms).transpose()?;

        let record = self
            .store
            .update_settings(id, strength, think_time)
            .await?;
        info!(
            "[SESSION] Game {}: strength {}, think time {}ms",
            id,
            record.strength.get(),
            record.think_time_ms
        );
        GameState::from_record(record)
    }

    pub async fn set_strength(&self, id: Uuid, value: i64) -> SessionResult<GameState> {
        self.update_settings(id, Some(value), None).await
    }

    pub async fn delete_game(&self, id: Uuid) -> SessionResult<()> {
        self.store.delete(id).await?;
        info!("[SESSION] Deleted game {}", id);
        Ok(())
    }

    /// Apply the opponent's reply to a game left waiting on it
    pub async fn reply_if_due(&self, id: Uuid) -> SessionResult<Option<OpponentReply>> {
        let record = self.store.fetch(id).await?;
        self.reply_to(&record).await
    }

    /// Whether `state` is waiting on the opponent
    pub fn is_reply_due(&self, state: &GameState) -> bool {
        self.policy.is_due(&state.record, &state.replay)
    }

    async fn reply_to(&self, record: &GameRecord) -> SessionResult<Option<OpponentReply>> {
        let replay = replay_record(record)?;
        if !self.policy.is_due(record, &replay) {
            return Ok(None);
        }
        let Some(chosen) = self.policy.choose_reply(record, &replay).await else {
            return Ok(None);
        };

        let applied = apply_move(self.store.as_ref(), record, &chosen.code).await?;
        debug!(
            "[SESSION] Game {}: opponent played {} ({:?})",
            record.id, applied.san, chosen.source
        );
        Ok(Some(OpponentReply {
            applied,
            source: chosen.source,
        }))
    }
}
