use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Failure of the external recommendation call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendationError {
    #[error("recommendation service unreachable: {0}")]
    Transport(String),

    #[error("recommendation service rejected credentials: {0}")]
    Authentication(String),

    #[error("recommendation service returned no text")]
    EmptyResponse,

    #[error("recommendation payload does not match schema: {0}")]
    Schema(String),

    #[error("failed to encode recommendation request: {0}")]
    Encoding(String),
}

impl RecommendationError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RecommendationError::Transport(_) => "transport",
            RecommendationError::Authentication(_) => "authentication",
            RecommendationError::EmptyResponse => "empty_response",
            RecommendationError::Schema(_) => "schema",
            RecommendationError::Encoding(_) => "encoding",
        }
    }
}

/// Transition not allowed from the console's current screen.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConsoleError {
    #[error("no recommendations to select from")]
    NothingToSelect,

    #[error("recommendation index {0} out of range")]
    UnknownOption(usize),

    #[error("{action} is not allowed on the {screen} screen")]
    WrongScreen {
        action: &'static str,
        screen: &'static str,
    },

    #[error("customer transport id cannot be empty")]
    MissingTransportId,
}

impl From<ConsoleError> for AppError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::MissingTransportId => AppError::BadRequest(err.to_string()),
            other => AppError::Conflict(other.to_string()),
        }
    }
}
