use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Slab well-formedness failures, reported as a list so the admin UI
    /// can render every problem at once.
    #[error("slab validation failed")]
    SlabValidation(Vec<String>),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Authorization(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": msg }),
            ),
            AppError::SlabValidation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "validation failed", "errors": errors }),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };

        (status, Json(body)).into_response()
    }
}
