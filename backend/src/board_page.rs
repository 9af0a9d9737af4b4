//! Server-rendered board
//!
//! Plain HTML with no scripts. Selecting a piece is a link carrying
//! `?rank=&file=` (zero-based); each target square is a submit button for the
//! shared move form. After a move the browser is redirected back to the board.

use crate::api::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chess_rules::{color_name, Color, Piece, Role, Square};
use chess_session::selection::{replay_view, square_at, Affordance};
use chess_session::{GameState, SessionError, SquareView, Strength};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

const STYLE: &str = "body{font-family:sans-serif}\
.board{display:grid;grid-template-columns:repeat(8,3em);border:2px solid #444;width:24em}\
.square{width:3em;height:3em;display:flex;align-items:center;justify-content:center;font-size:2em}\
.square a{text-decoration:none;color:inherit}\
.light{background:#f0d9b5}.dark{background:#b58863}\
.highlighted{background:#f6f669}.glow{box-shadow:inset 0 0 8px 3px #3c9}\
.square button{font-size:.4em}";

#[derive(Deserialize, Debug, Default)]
pub struct SelectionQuery {
    pub rank: Option<u32>,
    pub file: Option<u32>,
}

#[derive(Deserialize, Debug)]
pub struct MoveForm {
    #[serde(rename = "move")]
    pub code: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct NewGameForm {
    pub black_smartness: Option<i64>,
}

/// Escape text for use in element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn game_path(id: Uuid) -> String {
    format!("/game/{id}/")
}

fn piece_glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

fn render_square(id: Uuid, view: &SquareView, selected: Option<Square>) -> String {
    let mut classes = vec!["square", if view.is_light() { "light" } else { "dark" }];
    if let Some(class) = view.flavor.css_class() {
        classes.push(class);
    }
    if view.last_move {
        classes.push("glow");
    }
    let glyph = view.piece.map(piece_glyph).map(String::from).unwrap_or_default();

    let content = match (view.flavor.affordance(), selected) {
        (Affordance::Select, _) => format!(
            r#"<a href="{}?rank={}&amp;file={}">{}</a>"#,
            game_path(id),
            u32::from(view.square.rank()),
            u32::from(view.square.file()),
            glyph
        ),
        (Affordance::Deselect, _) => format!(r#"<a href="{}">{}</a>"#, game_path(id), glyph),
        (Affordance::Move, Some(from)) => format!(
            r#"{glyph}<button type="submit" form="move" name="move" value="{from}{to}">{from}{to}</button>"#,
            to = view.square
        ),
        _ => glyph,
    };

    format!(
        r#"<div class="{}" data-flavor="{:?}">{}</div>"#,
        classes.join(" "),
        view.flavor,
        content
    )
}

/// Full page for one game
pub fn render_game(
    state: &GameState,
    selected: Option<Square>,
    notice: Option<&str>,
) -> ApiResult<String> {
    let id = state.id();
    let view = replay_view(&state.replay, selected).map_err(|e| {
        ApiError::bad_request("not_selectable", e.to_string())
    })?;

    let mut board = String::new();
    for row in view.rows() {
        for square in row {
            board.push_str(&render_square(id, square, view.selected));
        }
    }

    let status = match (state.whose_turn(), state.outcome()) {
        (Some(color), _) => format!("{} to move", color_name(color)),
        (None, Some(outcome)) => outcome.description(),
        (None, None) => "Game over".to_string(),
    };
    let notice = notice
        .map(|text| format!(r#"<p class="notice">{}</p>"#, escape_html(text)))
        .unwrap_or_default();
    let moves = escape_html(&state.replay.san.join(" "));

    Ok(format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>{name}</title><style>{STYLE}</style></head>
<body>
<h1>{name}</h1>
<p>{status} &middot; strength {strength}</p>
{notice}
<form id="move" method="post" action="{path}move/"></form>
<div class="board">{board}</div>
<p class="moves">{moves}</p>
<p><a href="/">All games</a></p>
</body></html>"#,
        name = escape_html(&state.record.name),
        strength = state.record.strength.get(),
        path = game_path(id),
    ))
}

/// Game list with a "new game" form
pub async fn index(State(app): State<AppState>) -> ApiResult<Html<String>> {
    let games = app.session.list_games().await?;
    let rows: String = games
        .iter()
        .map(|game| {
            let status = match game.outcome() {
                Some(outcome) => outcome.to_string(),
                None => format!("{} moves", game.record.move_count()),
            };
            format!(
                r#"<li><a href="{}">{}</a> ({})</li>"#,
                game_path(game.id()),
                escape_html(&game.record.name),
                status
            )
        })
        .collect();

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Chess</title></head>
<body>
<form method="post" action="/game/">
<label>Strength <input type="number" name="black_smartness" min="0" max="10" value="10"></label>
<button type="submit">New game</button>
</form>
<ul>{rows}</ul>
</body></html>"#
    )))
}

pub async fn create_game(
    State(app): State<AppState>,
    Form(form): Form<NewGameForm>,
) -> ApiResult<Redirect> {
    let strength = match form.black_smartness {
        Some(value) => Strength::new(value)?,
        None => Strength::default(),
    };
    let game = app.session.create_game(strength).await?;
    Ok(Redirect::to(&game_path(game.id())))
}

pub async fn show_game(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SelectionQuery>,
) -> ApiResult<Html<String>> {
    let selected = match (query.rank, query.file) {
        (Some(rank), Some(file)) => Some(square_at(rank, file).ok_or_else(|| {
            ApiError::bad_request("not_selectable", format!("no square at rank {rank}, file {file}"))
        })?),
        _ => None,
    };
    let game = app.session.game(id).await?;
    Ok(Html(render_game(&game, selected, None)?))
}

/// Rejected moves re-render the board with the reason instead of redirecting
pub async fn submit_move(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<MoveForm>,
) -> ApiResult<Response> {
    match app.session.play_move(id, &form.code).await {
        Ok(report) => {
            debug!("[API] Board move {} in game {}", report.move_made.code, id);
            Ok(Redirect::to(&game_path(id)).into_response())
        }
        Err(e @ (SessionError::GameFinished { .. }
        | SessionError::MalformedMove { .. }
        | SessionError::IllegalMove { .. })) => {
            let game = app.session.game(id).await?;
            let page = render_game(&game, None, Some(&e.to_string()))?;
            Ok((StatusCode::BAD_REQUEST, Html(page)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
