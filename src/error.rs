//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Resource errors
    NotFound(String),
    AlreadyExists(String),

    // Validation errors
    ValidationError(String),

    // Backend errors, client may retry
    ServiceUnavailable(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::AlreadyExists(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ServiceUnavailable(msg) => {
                tracing::warn!("Backend error: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Potentially transient backend error, retry later")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IdentifierMismatch { .. } => AppError::ValidationError(err.to_string()),
            StoreError::AlreadyExists(_) => AppError::AlreadyExists(err.to_string()),
            StoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            StoreError::Backend(_) => AppError::ServiceUnavailable(err.to_string()),
            StoreError::CorruptStoredValue { .. } | StoreError::Serialize(_) => {
                AppError::InternalError(err.to_string())
            }
        }
    }
}
