//! API Routes
//!
//! Configures the Axum router with the caching layer's operational
//! endpoints. The router is mountable: the host backend nests it under its
//! admin surface, and the standalone binary serves it directly.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_and_warm_handler, delete_key_handler, flush_handler, health_handler,
    invalidate_handler, reset_stats_handler, stats_handler, warm_handler, AppState,
};

/// Creates the operational router.
///
/// # Endpoints
/// - `GET /health` - Liveness and cache status
/// - `GET /stats` - Hit/miss statistics plus store introspection
/// - `POST /stats/reset` - Zero the statistics counters
/// - `POST /warm` - Trigger a manual warming run
/// - `POST /clear-and-warm` - Clear the namespace, then warm
/// - `POST /invalidate` - Purge keys matching a pattern
/// - `DELETE /keys/:key` - Delete a single key
/// - `DELETE /flush` - Clear the whole namespace
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/reset", post(reset_stats_handler))
        .route("/warm", post(warm_handler))
        .route("/clear-and-warm", post(clear_and_warm_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/keys/:key", delete(delete_key_handler))
        .route("/flush", delete(flush_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
