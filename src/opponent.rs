//! Opponent policy
//!
//! Chooses the computer side's reply. The strength setting (0-10) and a window
//! that repeats every ten replies decide whether the external move generator is
//! consulted:
//!
//! ```text
//! consult  <=>  (half-moves already played by the policy side) % 10 < strength
//!               && generator.is_available()
//! ```
//!
//! Strength 0 never consults it, strength 10 always does. Everything else (an
//! absent generator, a failed or timed-out request, a null move, a move that is
//! not legal here) falls back to a uniformly random legal move. Generator
//! failures are logged and never reach the caller.
//!
//! The policy only picks a code. The caller applies it through
//! [`crate::apply::apply_move`], which validates it again.

use crate::promotion;
use crate::record::{GameRecord, Strength};
use crate::replay::Replay;
use chess_rules::Color;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uci_opponent::{MoveGenerator, SearchRequest};

/// Length of the repeating consult window, in replies
pub const WINDOW: usize = 10;

/// Where a reply came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Generator,
    Random,
}

/// A chosen reply, not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenReply {
    pub code: String,
    pub source: ReplySource,
}

/// Whether the reply after `halfmoves_for_side` prior replies may consult the generator
pub fn within_window(halfmoves_for_side: usize, strength: Strength) -> bool {
    halfmoves_for_side % WINDOW < usize::from(strength.get())
}

pub struct OpponentPolicy {
    generator: Arc<dyn MoveGenerator>,
    rng: Mutex<StdRng>,
    side: Color,
}

impl std::fmt::Debug for OpponentPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpponentPolicy")
            .field("generator", &self.generator.name())
            .field("side", &self.side)
            .finish()
    }
}

impl OpponentPolicy {
    /// Policy playing Black with an OS-seeded random source
    pub fn new(generator: Arc<dyn MoveGenerator>) -> Self {
        Self::with_rng(generator, StdRng::from_os_rng())
    }

    /// Deterministic fallback choices, for tests and replays
    pub fn with_seed(generator: Arc<dyn MoveGenerator>, seed: u64) -> Self {
        Self::with_rng(generator, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: Arc<dyn MoveGenerator>, rng: StdRng) -> Self {
        Self {
            generator,
            rng: Mutex::new(rng),
            side: Color::Black,
        }
    }

    /// The policy-controlled side
    pub fn side(&self) -> Color {
        self.side
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Whether `replay` is waiting on a reply from the policy side
    pub fn is_due(&self, record: &GameRecord, replay: &Replay) -> bool {
        record.in_progress && !replay.is_terminal() && replay.turn() == self.side
    }

    /// Pick one reply; `None` only when there is no legal move at all
    pub async fn choose_reply(&self, record: &GameRecord, replay: &Replay) -> Option<ChosenReply> {
        let legal = replay.legal_codes();
        if legal.is_empty() {
            debug!("[OPPONENT] No legal reply in game {}", record.id);
            return None;
        }

        let halfmoves = record.halfmoves_played_by(self.side);
        if within_window(halfmoves, record.strength) && self.generator.is_available() {
            if let Some(code) = self.consult(record, replay).await {
                return Some(ChosenReply {
                    code,
                    source: ReplySource::Generator,
                });
            }
        }

        let code = legal.choose(&mut *self.rng.lock())?.clone();
        debug!(
            "[OPPONENT] Random reply {} in game {} (strength {}, window {})",
            code,
            record.id,
            record.strength.get(),
            halfmoves % WINDOW
        );
        Some(ChosenReply {
            code,
            source: ReplySource::Random,
        })
    }

    /// One generator request; `None` means fall back
    async fn consult(&self, record: &GameRecord, replay: &Replay) -> Option<String> {
        let request = SearchRequest::new(replay.fen(), record.think_time());
        match self.generator.best_move(&request).await {
            Ok(Some(code)) if is_legal_here(replay, &code) => {
                info!(
                    "[OPPONENT] {} chose {} in game {}",
                    self.generator.name(),
                    code,
                    record.id
                );
                Some(code)
            }
            Ok(Some(code)) => {
                warn!(
                    "[OPPONENT] {} suggested {} which is not legal in game {}, moving randomly",
                    self.generator.name(),
                    code,
                    record.id
                );
                None
            }
            Ok(None) => {
                warn!(
                    "[OPPONENT] {} returned no move for game {}, moving randomly",
                    self.generator.name(),
                    record.id
                );
                None
            }
            Err(e) => {
                warn!(
                    "[OPPONENT] {} failed for game {}: {}, moving randomly",
                    self.generator.name(),
                    record.id,
                    e
                );
                None
            }
        }
    }
}

fn is_legal_here(replay: &Replay, code: &str) -> bool {
    chess_rules::from_code(code)
        .map(|candidate| promotion::normalize(&replay.position, candidate))
        .and_then(|candidate| chess_rules::resolve(&replay.position, &candidate))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::reconstruct;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uci_opponent::{AbsentGenerator, GeneratorError, GeneratorResult};

    /// Answers every request the same way and counts requests
    struct Scripted {
        answer: fn() -> GeneratorResult<Option<String>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(answer: fn() -> GeneratorResult<Option<String>>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MoveGenerator for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            true
        }

        async fn best_move(&self, _request: &SearchRequest) -> GeneratorResult<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn after_e4(strength: u8) -> (GameRecord, Replay) {
        let mut record = GameRecord::new("test", Strength::new(i64::from(strength)).unwrap());
        record.moves = vec!["e2e4".to_string()];
        let replay = reconstruct(&record.moves).unwrap();
        (record, replay)
    }

    #[test]
    fn test_window_thresholds() {
        for n in 0..30 {
            assert!(!within_window(n, Strength::MIN));
            assert!(within_window(n, Strength::MAX));
        }
        let five = Strength::new(5).unwrap();
        let consulted: Vec<bool> = (0..20).map(|n| within_window(n, five)).collect();
        assert_eq!(&consulted[..10], &consulted[10..]);
        assert_eq!(consulted.iter().filter(|c| **c).count(), 10);
        assert!(consulted[4] && !consulted[5]);
    }

    #[tokio::test]
    async fn test_strength_zero_never_consults() {
        let generator = Scripted::new(|| Ok(Some("e7e5".to_string())));
        let policy = OpponentPolicy::with_seed(generator.clone(), 1);
        let (record, replay) = after_e4(0);

        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(reply.source, ReplySource::Random);
        assert!(replay.legal_codes().contains(&reply.code));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_strength_ten_uses_generator_move() {
        let generator = Scripted::new(|| Ok(Some("e7e5".to_string())));
        let policy = OpponentPolicy::with_seed(generator.clone(), 1);
        let (record, replay) = after_e4(10);

        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(
            reply,
            ChosenReply {
                code: "e7e5".to_string(),
                source: ReplySource::Generator
            }
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_generator_failure_falls_back() {
        let generator = Scripted::new(|| Err(GeneratorError::Timeout(std::time::Duration::ZERO)));
        let policy = OpponentPolicy::with_seed(generator.clone(), 3);
        let (record, replay) = after_e4(10);

        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(reply.source, ReplySource::Random);
        assert!(replay.legal_codes().contains(&reply.code));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_null_and_illegal_suggestions_fall_back() {
        let (record, replay) = after_e4(10);

        let null = Scripted::new(|| Ok(None));
        let policy = OpponentPolicy::with_seed(null.clone(), 5);
        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(reply.source, ReplySource::Random);

        let illegal = Scripted::new(|| Ok(Some("e2e4".to_string())));
        let policy = OpponentPolicy::with_seed(illegal.clone(), 5);
        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(reply.source, ReplySource::Random);
        assert_eq!(illegal.calls(), 1);
    }

    #[tokio::test]
    async fn test_absent_generator_is_never_asked() {
        let policy = OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 9);
        let (record, replay) = after_e4(10);

        let reply = policy.choose_reply(&record, &replay).await.unwrap();
        assert_eq!(reply.source, ReplySource::Random);
    }

    #[tokio::test]
    async fn test_seeded_fallback_is_reproducible() {
        let (record, replay) = after_e4(0);
        let a = OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 42);
        let b = OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 42);
        for _ in 0..5 {
            assert_eq!(
                a.choose_reply(&record, &replay).await,
                b.choose_reply(&record, &replay).await
            );
        }
    }

    #[tokio::test]
    async fn test_no_legal_moves_yields_nothing() {
        let mut record = GameRecord::new("test", Strength::MAX);
        record.moves = ["f2f3", "e7e5", "g2g4", "d8h4"]
            .iter()
            .map(|m| m.to_string())
            .collect();
        let replay = reconstruct(&record.moves).unwrap();
        let policy = OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 0);
        assert!(policy.choose_reply(&record, &replay).await.is_none());
        assert!(!policy.is_due(&record, &replay));
    }
}
