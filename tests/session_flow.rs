//! Session Flow Integration Tests
//!
//! Full games driven through the public API:
//! - Move application and turn alternation
//! - Scholar's mate ending the game
//! - Rejected moves leaving the store untouched
//! - The opponent's consult window over many replies

use async_trait::async_trait;
use chess_rules::Color;
use chess_session::{
    apply_move, GameRecord, GameSession, GameStore, MemoryStore, OpponentPolicy, ReplySource,
    SessionError, Strength,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use uci_opponent::{AbsentGenerator, GeneratorResult, MoveGenerator, SearchRequest};

/// Plays the first legal move of whatever position it is given
#[derive(Default)]
struct FirstLegal {
    calls: AtomicUsize,
}

#[async_trait]
impl MoveGenerator for FirstLegal {
    fn name(&self) -> &str {
        "first-legal"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn best_move(&self, request: &SearchRequest) -> GeneratorResult<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let position = chess_rules::position_from_fen(&request.fen).expect("valid fen");
        Ok(chess_rules::legal_codes(&position).into_iter().next())
    }
}

async fn new_game(store: &MemoryStore) -> GameRecord {
    let record = GameRecord::new("flow test", Strength::default());
    store.insert(&record).await.unwrap();
    record
}

// ============================================================================
// Move Application
// ============================================================================

#[tokio::test]
async fn test_scholars_mate_scenario() {
    let store = MemoryStore::new();
    let mut record = new_game(&store).await;

    record = apply_move(&store, &record, "e2e4").await.unwrap().record;
    assert_eq!(record.moves.len(), 1);
    assert_eq!(record.side_to_move(), Color::Black);
    assert!(record.in_progress);

    record = apply_move(&store, &record, "e7e5").await.unwrap().record;
    assert_eq!(record.moves.len(), 2);
    assert_eq!(record.side_to_move(), Color::White);

    for code in ["f1c4", "b8c6", "d1h5", "g8f6"] {
        record = apply_move(&store, &record, code).await.unwrap().record;
        assert!(record.in_progress);
    }

    let mate = apply_move(&store, &record, "h5f7").await.unwrap();
    assert!(!mate.record.in_progress);
    assert_eq!(mate.outcome.and_then(|o| o.winner()), Some(Color::White));
    assert_eq!(mate.san, "Qxf7#");

    let error = apply_move(&store, &mate.record, "e8f7").await.unwrap_err();
    assert!(matches!(error, SessionError::GameFinished { .. }));
    assert_eq!(store.fetch(record.id).await.unwrap().moves.len(), 7);
}

#[tokio::test]
async fn test_illegal_move_leaves_record_unchanged() {
    let store = MemoryStore::new();
    let record = new_game(&store).await;
    let record = apply_move(&store, &record, "e2e4").await.unwrap().record;

    for code in ["e2e4", "e7e4", "a1a8", "e8e7"] {
        let error = apply_move(&store, &record, code).await.unwrap_err();
        assert!(
            matches!(error, SessionError::IllegalMove { .. }),
            "{code}: {error}"
        );
        let stored = store.fetch(record.id).await.unwrap();
        assert_eq!(stored.moves.len(), 1);
        assert!(stored.in_progress);
    }
}

// ============================================================================
// Opponent Policy
// ============================================================================

/// Play human moves until `replies` opponent replies were made or the game ends
async fn sources_over(strength: u8, replies: usize) -> (Vec<ReplySource>, usize) {
    let generator = Arc::new(FirstLegal::default());
    let session = GameSession::new(
        Arc::new(MemoryStore::new()),
        OpponentPolicy::with_seed(generator.clone(), 17),
    );
    let strength = Strength::new(i64::from(strength)).unwrap();
    let mut state = session.create_game(strength).await.unwrap();

    let mut sources = Vec::new();
    while sources.len() < replies && state.whose_turn() == Some(Color::White) {
        let code = state.legal_codes().last().cloned().expect("white can move");
        let report = session.play_move(state.id(), &code).await.unwrap();
        if let Some(reply) = &report.reply {
            sources.push(reply.source);
        }
        state = report.state;
    }
    (sources, generator.calls.load(Ordering::SeqCst))
}

#[tokio::test]
async fn test_strength_zero_never_consults_generator() {
    let (sources, calls) = sources_over(0, 12).await;
    assert!(!sources.is_empty());
    assert!(sources.iter().all(|s| *s == ReplySource::Random));
    assert_eq!(calls, 0);
}

#[tokio::test]
async fn test_strength_ten_consults_on_every_reply() {
    let (sources, calls) = sources_over(10, 12).await;
    assert!(!sources.is_empty());
    assert!(sources.iter().all(|s| *s == ReplySource::Generator));
    assert_eq!(calls, sources.len());
}

#[tokio::test]
async fn test_window_repeats_every_ten_replies() {
    let (sources, calls) = sources_over(4, 20).await;
    for (n, source) in sources.iter().enumerate() {
        let expected = if n % 10 < 4 {
            ReplySource::Generator
        } else {
            ReplySource::Random
        };
        assert_eq!(*source, expected, "reply #{n}");
    }
    let consulted = sources
        .iter()
        .filter(|s| **s == ReplySource::Generator)
        .count();
    assert_eq!(calls, consulted);
}

#[tokio::test]
async fn test_absent_generator_still_replies() {
    let session = GameSession::new(
        Arc::new(MemoryStore::new()),
        OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 5),
    );
    let state = session.create_game(Strength::MAX).await.unwrap();
    let report = session.play_move(state.id(), "d2d4").await.unwrap();
    assert_eq!(
        report.reply.map(|r| r.source),
        Some(ReplySource::Random)
    );
    assert_eq!(report.state.record.moves.len(), 2);
}

#[tokio::test]
async fn test_no_reply_after_mating_move() {
    let store = Arc::new(MemoryStore::new());
    let session = GameSession::new(
        store.clone(),
        OpponentPolicy::with_seed(Arc::new(AbsentGenerator), 5),
    );
    let mut record = GameRecord::new("mate in one", Strength::MIN);
    record.moves = ["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6"]
        .iter()
        .map(|m| m.to_string())
        .collect();
    store.insert(&record).await.unwrap();

    let report = session.play_move(record.id, "h5f7").await.unwrap();
    assert!(report.reply.is_none());
    assert!(!report.state.record.in_progress);
    assert_eq!(report.state.whose_turn(), None);
    assert!(report.state.legal_codes().is_empty());
}
