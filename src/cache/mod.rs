//! Cache Module
//!
//! The declarative caching layer: the cache service over the store adapter,
//! operation tags with their registration table, and the request-pipeline
//! interceptor.

mod interceptor;
mod registry;
mod service;
mod stats;
mod tags;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use interceptor::{default_cache_key, CacheInterceptor};
pub use registry::TagRegistry;
pub use service::{CacheOptions, CacheService, TTL_ABSENT, TTL_NO_EXPIRY};
pub use stats::{CacheStats, KeyAccess, StatsRecorder, MOST_ACCESSED_LIMIT};
pub use tags::{
    InvalidateFn, InvalidateSpec, KeyFn, KeySpec, OperationTags, RequestContext,
    BYPASS_QUERY_FLAG,
};
