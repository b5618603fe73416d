//! Lexcache - declarative caching layer for the consultation marketplace backend
//!
//! Provides a read-through cache over a remote key-value store with
//! automatic key derivation, TTL control, pattern-based invalidation,
//! graceful degradation on store failure, hit/miss statistics, and
//! scheduled/manual cache warming.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod runtime;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    CacheInterceptor, CacheOptions, CacheService, OperationTags, RequestContext, TagRegistry,
};
pub use config::Config;
pub use runtime::CacheRuntime;
pub use tasks::{spawn_warming_task, CacheWarmer};
