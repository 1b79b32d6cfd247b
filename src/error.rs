//! Error types for castlist
//!
//! Two layers: `StoreError` is the taxonomy the database layer speaks
//! (not-found, uniqueness collisions, broken references), and `ApiError`
//! turns those plus handler-level failures into JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::chat_client::ChatClientError;

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store-layer error taxonomy
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested row absent, or vanished before the write landed
    #[error("not found: {0}")]
    NotFound(String),

    /// Another row already holds this entity's uniqueness key
    #[error("{0}")]
    DuplicateEntity(String),

    /// Another row already links this (actor, movie) pair
    #[error("{0}")]
    DuplicateRelationship(String),

    /// Foreign key points at a row that does not exist
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Unexpected database failure (wraps sqlx::Error)
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a write failure: unique-index and foreign-key violations map
    /// to the given typed errors, everything else stays a database error.
    ///
    /// The unique indexes back up the application-layer duplicate pre-checks,
    /// so a race between two identical writes still surfaces as a duplicate
    /// instead of a bare constraint failure.
    pub fn from_write_error(err: sqlx::Error, duplicate: StoreError, reference: &str) -> StoreError {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => duplicate,
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                StoreError::InvalidReference(reference.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Required backend not configured (503)
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Chat-completion backend failure (502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] ChatClientError),

    /// Store-layer error, mapped per variant
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", msg),
            ApiError::Upstream(ref err) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", err.to_string())
            }
            ApiError::Store(store) => match store {
                StoreError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                StoreError::DuplicateEntity(msg) => {
                    (StatusCode::CONFLICT, "DUPLICATE_ENTITY", msg)
                }
                StoreError::DuplicateRelationship(msg) => {
                    (StatusCode::CONFLICT, "DUPLICATE_RELATIONSHIP", msg)
                }
                StoreError::InvalidReference(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_FAILED", msg)
                }
                StoreError::Database(ref err) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    err.to_string(),
                ),
            },
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
