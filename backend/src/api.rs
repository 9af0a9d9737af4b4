use crate::board_page;
use crate::error::{ApiError, ApiResult};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Json, Path, State},
    http::{HeaderName, HeaderValue, StatusCode},
    routing::{get, post},
    Router,
};
use chess_rules::color_name;
use chess_session::{GameSession, GameState, Strength};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

pub const API_VERSION_HEADER: &str = "x-chess-api-version";
pub const API_VERSION: &str = "2";

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<GameSession>,
}

/// One row of the game list
#[derive(Serialize, Debug)]
pub struct GameSummary {
    pub id: Uuid,
    pub name: String,
    pub in_progress: bool,
    pub move_count: usize,
    pub black_smartness: u8,
    /// "white" / "black", or "" once the game is over
    pub whose_turn: &'static str,
    pub outcome: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct GameList {
    pub in_progress: Vec<GameSummary>,
    pub completed: Vec<GameSummary>,
}

#[derive(Serialize, Debug)]
pub struct CapturedView {
    /// Black pieces captured by White
    pub white: Vec<String>,
    /// White pieces captured by Black
    pub black: Vec<String>,
    pub material_advantage: i32,
}

#[derive(Serialize, Debug)]
pub struct GameDetail {
    pub id: Uuid,
    pub name: String,
    pub in_progress: bool,
    pub black_smartness: u8,
    pub think_time_ms: u32,
    pub move_count: usize,
    pub move_uci: Vec<String>,
    pub move_san: Vec<String>,
    pub board_fen: String,
    pub whose_turn: &'static str,
    pub legal_moves: Vec<String>,
    pub captured_pieces: CapturedView,
    pub outcome: Option<String>,
    /// Longer outcome text, e.g. "Draw by stalemate"
    pub result: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct MoveResponse {
    pub move_made: String,
    pub ai_response: Option<String>,
    pub game_state: GameDetail,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateGameRequest {
    pub black_smartness: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateGameRequest {
    pub black_smartness: Option<i64>,
    pub think_time_ms: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct MoveRequest {
    #[serde(rename = "move")]
    pub code: String,
}

fn whose_turn(state: &GameState) -> &'static str {
    state.whose_turn().map(color_name).unwrap_or("")
}

impl From<&GameState> for GameSummary {
    fn from(state: &GameState) -> Self {
        let record = &state.record;
        Self {
            id: record.id,
            name: record.name.clone(),
            in_progress: record.in_progress,
            move_count: record.move_count(),
            black_smartness: record.strength.get(),
            whose_turn: whose_turn(state),
            outcome: state.outcome().map(|o| o.to_string()),
        }
    }
}

impl From<&GameState> for GameDetail {
    fn from(state: &GameState) -> Self {
        let record = &state.record;
        let captured = &state.replay.captured;
        Self {
            id: record.id,
            name: record.name.clone(),
            in_progress: record.in_progress,
            black_smartness: record.strength.get(),
            think_time_ms: record.think_time_ms,
            move_count: record.move_count(),
            move_uci: state.replay.codes.clone(),
            move_san: state.replay.san.clone(),
            board_fen: state.replay.fen(),
            whose_turn: whose_turn(state),
            legal_moves: state.legal_codes(),
            captured_pieces: CapturedView {
                white: captured.symbols(chess_rules::Color::White),
                black: captured.symbols(chess_rules::Color::Black),
                material_advantage: captured.material_advantage(),
            },
            outcome: state.outcome().map(|o| o.to_string()),
            result: state.outcome().map(|o| o.description()),
            created: record.created,
            modified: record.modified,
        }
    }
}

pub fn router(session: Arc<GameSession>) -> Router {
    let state = AppState { session };

    Router::new()
        .route("/health", get(health))
        .route("/api/games/", get(list_games).post(create_game))
        .route(
            "/api/games/{id}/",
            get(get_game).patch(update_game).delete(delete_game),
        )
        .route("/api/games/{id}/moves/", post(make_move))
        .route("/", get(board_page::index))
        .route("/game/", post(board_page::create_game))
        .route("/game/{id}/", get(board_page::show_game))
        .route("/game/{id}/move/", post(board_page::submit_move))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

async fn list_games(State(state): State<AppState>) -> ApiResult<Json<GameList>> {
    let games = state.session.list_games().await?;
    let (in_progress, completed): (Vec<_>, Vec<_>) =
        games.iter().partition(|game| game.record.in_progress);
    Ok(Json(GameList {
        in_progress: in_progress.into_iter().map(GameSummary::from).collect(),
        completed: completed.into_iter().map(GameSummary::from).collect(),
    }))
}

/// The body is optional; an empty one creates a game with default settings
async fn create_game(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<GameDetail>)> {
    let request: CreateGameRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::bad_request("malformed_body", e.to_string()))?
    };
    let strength = match request.black_smartness {
        Some(value) => Strength::new(value)?,
        None => Strength::default(),
    };
    let game = state.session.create_game(strength).await?;
    info!("[API] Created game {}", game.id());
    Ok((StatusCode::CREATED, Json(GameDetail::from(&game))))
}

async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GameDetail>> {
    let game = state.session.game(id).await?;
    Ok(Json(GameDetail::from(&game)))
}

async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateGameRequest>, JsonRejection>,
) -> ApiResult<Json<GameDetail>> {
    let Json(request) = payload?;
    let game = state
        .session
        .update_settings(id, request.black_smartness, request.think_time_ms)
        .await?;
    Ok(Json(GameDetail::from(&game)))
}

async fn delete_game(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    state.session.delete_game(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn make_move(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<Json<MoveResponse>> {
    // a body without a usable `move` is a malformed move, whatever else is wrong with it
    let Json(request) =
        payload.map_err(|e| ApiError::bad_request("malformed_move", e.body_text()))?;
    let report = state.session.play_move(id, &request.code).await?;
    Ok(Json(MoveResponse {
        move_made: report.move_made.code,
        ai_response: report.reply.map(|reply| reply.applied.code),
        game_state: GameDetail::from(&report.state),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_session::GameRecord;

    fn state_for(moves: &[&str]) -> GameState {
        let mut record = GameRecord::new("calm jade river", Strength::default());
        record.moves = moves.iter().map(|m| m.to_string()).collect();
        let mut state = GameState::from_record(record).unwrap();
        state.record.in_progress = state.outcome().is_none();
        state
    }

    #[test]
    fn test_summary_of_new_game() {
        let summary = GameSummary::from(&state_for(&[]));
        assert_eq!(summary.whose_turn, "white");
        assert_eq!(summary.move_count, 0);
        assert!(summary.outcome.is_none());
    }

    #[test]
    fn test_detail_of_finished_game() {
        let detail = GameDetail::from(&state_for(&["f2f3", "e7e5", "g2g4", "d8h4"]));
        assert!(!detail.in_progress);
        assert_eq!(detail.whose_turn, "");
        assert!(detail.legal_moves.is_empty());
        assert_eq!(detail.outcome.as_deref(), Some("Black won"));
        assert_eq!(detail.result.as_deref(), Some("Black won by checkmate"));
        assert_eq!(detail.move_san.last().map(String::as_str), Some("Qh4#"));
    }

    #[test]
    fn test_move_request_uses_move_field() {
        let request: MoveRequest = serde_json::from_str(r#"{"move": "e2e4"}"#).unwrap();
        assert_eq!(request.code, "e2e4");
    }
}
