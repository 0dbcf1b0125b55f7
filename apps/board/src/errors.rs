use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::board::{LoadError, MoveError};

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// The interview flow could not be loaded; the page has nothing to render.
    #[error("Interview flow unavailable for position {position_id}: {message}")]
    FlowUnavailable {
        position_id: String,
        message: String,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Route of the user-initiated retry action for a position's board.
pub fn reload_route(position_id: &str) -> String {
    format!("/api/v1/positions/{position_id}/board/reload")
}

impl AppError {
    pub fn from_load(position_id: &str, err: LoadError) -> Self {
        AppError::FlowUnavailable {
            position_id: position_id.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<MoveError> for AppError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::UnknownCandidate(_) | MoveError::BoardNotLoaded(_) => {
                AppError::NotFound(err.to_string())
            }
            MoveError::MissingApplicationId(_) => AppError::UnprocessableEntity(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, retry) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
                None,
            ),
            AppError::FlowUnavailable {
                position_id,
                message,
            } => {
                tracing::error!("Flow unavailable for position {position_id}: {message}");
                (
                    StatusCode::BAD_GATEWAY,
                    "FLOW_UNAVAILABLE",
                    message.clone(),
                    Some(reload_route(position_id)),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(retry) = retry {
            error["retry"] = Value::String(retry);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
