//! API Module
//!
//! HTTP handlers and routing for the caching layer's operational REST API.
//!
//! # Endpoints
//! - `GET /health` - Liveness and cache status
//! - `GET /stats` - Cache statistics
//! - `POST /stats/reset` - Reset statistics
//! - `POST /warm` - Manual warming run
//! - `POST /clear-and-warm` - Full refresh
//! - `POST /invalidate` - Pattern invalidation
//! - `DELETE /keys/:key` - Single-key delete
//! - `DELETE /flush` - Namespace clear

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
