//! Error types for bookdex
//!
//! One API-facing error enum; handlers return `ApiResult` and rely on the
//! `IntoResponse` impl to produce the JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::forms::ValidationErrors;
use crate::services::google_books::GoogleBooksError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Form validation failure (422) with per-field messages
    #[error("Validation failed")]
    Validation(ValidationErrors),

    /// Upstream metadata service failure (502)
    #[error("Metadata service error: {0}")]
    Upstream(#[from] GoogleBooksError),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        // Write-time invariant violations surface as field-level messages,
        // same as form validation failures
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::InvalidIsbn(_) => {
                let mut errors = ValidationErrors::default();
                errors.add("isbn", err.to_string());
                ApiError::Validation(errors)
            }
            StoreError::InvalidPages(_) => {
                let mut errors = ValidationErrors::default();
                errors.add("pages", err.to_string());
                ApiError::Validation(errors)
            }
            StoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Validation errors carry field detail the other variants don't
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": {
                        "code": "VALIDATION_ERROR",
                        "message": "Validation failed",
                        "fields": errors,
                    }
                }),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                error_body("NOT_FOUND", &msg),
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                error_body("BAD_REQUEST", &msg),
            ),
            ApiError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                error_body("UPSTREAM_ERROR", &err.to_string()),
            ),
            ApiError::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("DATABASE_ERROR", &err.to_string()),
            ),
            ApiError::Other(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("INTERNAL_ERROR", &err.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

fn error_body(code: &str, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": code,
            "message": message,
        }
    })
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
