//! Response DTOs for the operational API
//!
//! Defines the structure of outgoing HTTP response bodies. Stats and warm
//! reports serialize their service-level types directly.

use serde::Serialize;

/// Response body for pattern invalidation (POST /invalidate)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// The pattern that was purged
    pub pattern: String,
    /// Number of keys removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(pattern: impl Into<String>, removed: usize) -> Self {
        Self {
            pattern: pattern.into(),
            removed,
        }
    }
}

/// Response body for single-key deletion (DELETE /keys/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for namespace flush (DELETE /flush)
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    /// Success message
    pub message: String,
}

impl FlushResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache namespace cleared".to_string(),
        }
    }
}

impl Default for FlushResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for statistics reset (POST /stats/reset)
#[derive(Debug, Clone, Serialize)]
pub struct ResetStatsResponse {
    /// Success message
    pub message: String,
}

impl ResetStatsResponse {
    pub fn new() -> Self {
        Self {
            message: "Statistics reset".to_string(),
        }
    }
}

impl Default for ResetStatsResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Whether caching is active or running degraded
    pub cache_enabled: bool,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(cache_enabled: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            cache_enabled,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
