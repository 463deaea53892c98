//! Error types for formcheck-va

use crate::types::AnalyzeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
///
/// Fatal errors only; per-instant and per-frame failures are recorded in
/// their result objects and never surface here.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upload did not declare a video media type (415)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Malformed multipart body (400)
    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// Fatal analysis failure, e.g. the duration probe (500)
    #[error("Analysis failed: {0}")]
    Analyze(#[from] AnalyzeError),

    /// IO error (500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::Multipart(ref err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Analyze(ref err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Io(ref err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        // `ok`/`msg` are the error half of the JSON compatibility surface.
        let body = Json(json!({
            "ok": false,
            "msg": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
