//! HTTP error responses
//!
//! Every failure leaves as JSON `{ "error": <message>, "code": <reason> }`.
//! Client mistakes map to 4xx; corrupt games and storage failures to 500.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chess_session::SessionError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    code: &'a str,
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code,
            message: message.into(),
        }
    }
}

/// A request body that is not JSON or does not fit the expected shape
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("[API] Rejected body: {}", rejection.body_text());
        Self::bad_request("malformed_body", rejection.body_text())
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        let status = match &e {
            SessionError::GameNotFound { .. } => StatusCode::NOT_FOUND,
            SessionError::Conflict { .. } => StatusCode::CONFLICT,
            _ if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if e.is_corruption() {
            error!("[API] Corrupt game data: {}", e);
        } else if status.is_server_error() {
            error!("[API] Request failed: {}", e);
        } else {
            warn!("[API] Rejected: {}", e);
        }

        Self {
            status,
            code: e.reason(),
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
