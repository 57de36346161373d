use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::domain::leave::TransitionError;

/// Failure taxonomy surfaced by every operation. Each variant maps to a
/// distinct HTTP response; nothing is swallowed or retried server-side.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::InvalidTransition(e) => (StatusCode::CONFLICT, e.to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} not found", what))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal server error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({
            "errors": [
                {
                    "status": status.as_u16(),
                    "detail": message
                }
            ]
        });

        (status, Json(body)).into_response()
    }
}

/// Error body shape, mirrored here for the OpenAPI document.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<ApiError>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ApiError {
    #[schema(example = 404)]
    pub status: u16,
    #[schema(example = "leave application not found")]
    pub detail: String,
}
