//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror. Store errors never reach
//! cache callers; they are absorbed by the cache service and degrade to a
//! miss-equivalent outcome. `ApiError` covers the operational HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failures of the backing key-value store or of (de)serialization.
///
/// Internal to the caching layer: the cache service logs these and returns
/// the miss-equivalent result instead of raising them.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection to the store could not be established
    #[error("store connection failed: {0}")]
    Connection(String),

    /// A store command failed
    #[error("store command failed: {0}")]
    Command(#[from] redis::RedisError),

    /// A store round-trip exceeded the configured timeout
    #[error("store call timed out after {0}ms")]
    Timeout(u64),

    /// The stored value cannot serve the requested operation
    #[error("store value error: {0}")]
    Value(String),

    /// Value could not be serialized or deserialized
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for store adapter operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == API Error Enum ==
/// Errors surfaced by the operational HTTP API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
