//! API Handlers
//!
//! HTTP request handlers for the operational endpoints of the caching
//! layer: statistics, manual warming, and invalidation controls.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheOptions, CacheService, CacheStats};
use crate::error::ApiError;
use crate::models::{
    DeleteResponse, FlushResponse, HealthResponse, InvalidateRequest, InvalidateResponse,
    ResetStatsResponse,
};
use crate::tasks::{CacheWarmer, WarmReport};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide cache service singleton
    pub service: Arc<CacheService>,
    /// The warming scheduler
    pub warmer: Arc<CacheWarmer>,
}

impl AppState {
    /// Creates a new AppState over an already-started cache runtime.
    pub fn new(service: Arc<CacheService>, warmer: Arc<CacheWarmer>) -> Self {
        Self { service, warmer }
    }
}

/// Handler for GET /health
///
/// Returns liveness plus whether caching is active or running degraded.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.is_enabled()))
}

/// Handler for GET /stats
///
/// Returns in-process hit/miss counters combined with live store
/// introspection. This response itself is never cached.
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.stats().await)
}

/// Handler for POST /stats/reset
pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<ResetStatsResponse> {
    state.service.reset_stats();
    Json(ResetStatsResponse::new())
}

/// Handler for POST /warm
///
/// Manually triggers a full warming run and reports per-source outcomes.
pub async fn warm_handler(State(state): State<AppState>) -> Json<WarmReport> {
    Json(state.warmer.trigger_warmup().await)
}

/// Handler for POST /clear-and-warm
///
/// Clears the cache namespace and re-warms, for forcing a full refresh
/// after a deploy or data correction.
pub async fn clear_and_warm_handler(State(state): State<AppState>) -> Json<WarmReport> {
    Json(state.warmer.clear_and_warm().await)
}

/// Handler for POST /invalidate
///
/// Purges every key matching the given pattern under the active namespace.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>, ApiError> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let removed = state
        .service
        .del_pattern(&req.pattern, &CacheOptions::default())
        .await;
    Ok(Json(InvalidateResponse::new(req.pattern, removed)))
}

/// Handler for DELETE /keys/:key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.service.del(&key, &CacheOptions::default()).await;
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /flush
///
/// Clears every key under the configured namespace.
pub async fn flush_handler(State(state): State<AppState>) -> Json<FlushResponse> {
    state.service.clear().await;
    Json(FlushResponse::new())
}
