//! Cache Service Module
//!
//! The only component that talks to the store adapter. Owns key
//! namespacing, serialization, the default TTL, the enable switch, and
//! in-process hit/miss statistics.
//!
//! Every operation is no-throw to callers: the cache is an optimization
//! layer, never a source of truth, so store failures and timeouts are
//! logged and degrade to a miss-equivalent or no-op outcome.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::store::{KeyTtl, StoreBackend};

/// `ttl()` result for a key that does not exist.
pub const TTL_ABSENT: i64 = -1;

/// `ttl()` result for a key with no expiry.
pub const TTL_NO_EXPIRY: i64 = -2;

// == Per-Call Options ==
/// Options accepted by every cache service operation.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// TTL override in seconds, used when the call passes no explicit TTL
    pub ttl: Option<u64>,
    /// Namespace override for this call only
    pub prefix: Option<String>,
    /// When true the call never touches the store
    pub bypass_cache: bool,
}

impl CacheOptions {
    /// Options that skip the store entirely.
    pub fn bypass() -> Self {
        Self {
            bypass_cache: true,
            ..Self::default()
        }
    }

    /// Options carrying only a TTL override.
    pub fn with_ttl(ttl: u64) -> Self {
        Self {
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Options carrying only a namespace override.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }
}

// == Cache Service ==
/// Read-through cache facade over the store adapter.
///
/// Constructed once at process start and shared behind an `Arc` by request
/// handlers and the warming scheduler.
pub struct CacheService {
    store: Arc<dyn StoreBackend>,
    prefix: String,
    default_ttl: u64,
    enabled: bool,
    op_timeout: Duration,
    stats: Mutex<StatsRecorder>,
}

impl CacheService {
    // == Constructor ==
    /// Creates a service over `store` configured from `config`.
    pub fn new(store: Arc<dyn StoreBackend>, config: &Config) -> Self {
        Self {
            store,
            prefix: config.key_prefix.clone(),
            default_ttl: config.default_ttl,
            enabled: config.cache_enabled,
            op_timeout: Duration::from_millis(config.store_timeout_ms),
            stats: Mutex::new(StatsRecorder::new()),
        }
    }

    /// Reflects the static configuration switch. When false, every other
    /// operation is an inert no-op/miss.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Default TTL in seconds applied when neither the call nor its options
    /// carry one.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    // == Key Building ==
    /// Builds the namespaced store key: `(override ?? configured prefix) + ":" + key`.
    ///
    /// Pure and deterministic: the same inputs always produce the same key.
    pub fn build_key(&self, key: &str, opts: &CacheOptions) -> String {
        let prefix = opts.prefix.as_deref().unwrap_or(&self.prefix);
        format!("{prefix}:{key}")
    }

    // == Get ==
    /// Fetches and deserializes the value cached under `key`.
    ///
    /// Returns `None` when the cache is disabled or bypassed, on a store
    /// miss or failure, and when the stored bytes do not deserialize; the
    /// last two count as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, opts: &CacheOptions) -> Option<T> {
        if !self.enabled || opts.bypass_cache {
            return None;
        }

        let full_key = self.build_key(key, opts);
        match self.bounded(self.store.get(&full_key)).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.stats.lock().unwrap().record_hit(&full_key);
                    debug!(key = %full_key, "cache hit");
                    Some(value)
                }
                Err(e) => {
                    // A value we can no longer read is as good as absent
                    warn!(key = %full_key, error = %e, "cached value failed to deserialize");
                    self.stats.lock().unwrap().record_miss();
                    None
                }
            },
            Ok(None) => {
                self.stats.lock().unwrap().record_miss();
                debug!(key = %full_key, "cache miss");
                None
            }
            Err(e) => {
                warn!(op = "get", key = %full_key, error = %e, "store failure, degrading to miss");
                self.stats.lock().unwrap().record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Serializes `value` and stores it under `key` with expiry
    /// `ttl ?? opts.ttl ?? default_ttl`. No-op when disabled or bypassed;
    /// store write failures are logged, never raised.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<u64>,
        opts: &CacheOptions,
    ) {
        if !self.enabled || opts.bypass_cache {
            return;
        }

        let full_key = self.build_key(key, opts);
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(op = "set", key = %full_key, error = %e, "value failed to serialize");
                return;
            }
        };

        let effective_ttl = ttl.or(opts.ttl).unwrap_or(self.default_ttl);
        if let Err(e) = self.bounded(self.store.set_ex(&full_key, &raw, effective_ttl)).await {
            warn!(op = "set", key = %full_key, error = %e, "store write failed");
        }
    }

    // == Delete ==
    /// Deletes a single key under the active namespace.
    pub async fn del(&self, key: &str, opts: &CacheOptions) {
        if !self.enabled || opts.bypass_cache {
            return;
        }

        let full_key = self.build_key(key, opts);
        if let Err(e) = self.bounded(self.store.del(&full_key)).await {
            warn!(op = "del", key = %full_key, error = %e, "store delete failed");
        }
    }

    /// Deletes every key matching `pattern` under the active namespace.
    ///
    /// The pattern is namespaced before it reaches the store, so deletion
    /// can never escape the active prefix. Returns the number of keys
    /// removed (0 on failure).
    pub async fn del_pattern(&self, pattern: &str, opts: &CacheOptions) -> usize {
        if !self.enabled || opts.bypass_cache {
            return 0;
        }

        let full_pattern = self.build_key(pattern, opts);
        match self.bounded(self.store.del_matching(&full_pattern)).await {
            Ok(removed) => {
                debug!(pattern = %full_pattern, removed, "invalidated keys");
                removed
            }
            Err(e) => {
                warn!(op = "del_pattern", pattern = %full_pattern, error = %e, "store delete failed");
                0
            }
        }
    }

    // == Exists / TTL ==
    /// Whether `key` currently exists under the active namespace.
    pub async fn exists(&self, key: &str, opts: &CacheOptions) -> bool {
        if !self.enabled || opts.bypass_cache {
            return false;
        }

        let full_key = self.build_key(key, opts);
        match self.bounded(self.store.exists(&full_key)).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(op = "exists", key = %full_key, error = %e, "store failure, degrading to false");
                false
            }
        }
    }

    /// Remaining TTL of `key` in seconds: `TTL_ABSENT` (-1) when missing,
    /// `TTL_NO_EXPIRY` (-2) when the key never expires.
    pub async fn ttl(&self, key: &str, opts: &CacheOptions) -> i64 {
        if !self.enabled || opts.bypass_cache {
            return TTL_ABSENT;
        }

        let full_key = self.build_key(key, opts);
        match self.bounded(self.store.ttl(&full_key)).await {
            Ok(KeyTtl::Absent) => TTL_ABSENT,
            Ok(KeyTtl::NoExpiry) => TTL_NO_EXPIRY,
            Ok(KeyTtl::Remaining(secs)) => secs as i64,
            Err(e) => {
                warn!(op = "ttl", key = %full_key, error = %e, "store failure, degrading to absent");
                TTL_ABSENT
            }
        }
    }

    // == Counters ==
    /// Atomically increments the counter at `key`. The first increment on
    /// an absent key yields 1. Returns 0 when disabled, bypassed, or on
    /// store failure.
    pub async fn increment(&self, key: &str, opts: &CacheOptions) -> i64 {
        self.adjust(key, opts, true).await
    }

    /// Atomically decrements the counter at `key`. Returns 0 when disabled,
    /// bypassed, or on store failure.
    pub async fn decrement(&self, key: &str, opts: &CacheOptions) -> i64 {
        self.adjust(key, opts, false).await
    }

    async fn adjust(&self, key: &str, opts: &CacheOptions, up: bool) -> i64 {
        if !self.enabled || opts.bypass_cache {
            return 0;
        }

        let full_key = self.build_key(key, opts);
        let result = if up {
            self.bounded(self.store.incr(&full_key)).await
        } else {
            self.bounded(self.store.decr(&full_key)).await
        };

        match result {
            Ok(value) => value,
            Err(e) => {
                let op = if up { "increment" } else { "decrement" };
                warn!(op, key = %full_key, error = %e, "store failure, degrading to 0");
                0
            }
        }
    }

    // == Statistics ==
    /// Point-in-time statistics: in-process counters plus live key-count
    /// and memory introspection from the store. Never cached itself.
    pub async fn stats(&self) -> CacheStats {
        let (hits, misses, hit_rate, most_accessed) = {
            let stats = self.stats.lock().unwrap();
            (
                stats.hits(),
                stats.misses(),
                stats.hit_rate(),
                stats.most_accessed(),
            )
        };

        let total_keys = match self.bounded(self.store.key_count()).await {
            Ok(count) => count,
            Err(e) => {
                warn!(op = "stats", error = %e, "store key count unavailable");
                0
            }
        };

        let memory_used_bytes = match self.bounded(self.store.memory_usage()).await {
            Ok(usage) => usage,
            Err(e) => {
                warn!(op = "stats", error = %e, "store memory usage unavailable");
                None
            }
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
            total_keys,
            memory_used_bytes,
            most_accessed,
        }
    }

    /// Zeroes hit/miss counters and the access-count map. Stored entries
    /// are untouched.
    pub fn reset_stats(&self) {
        self.stats.lock().unwrap().reset();
    }

    // == Clear ==
    /// Deletes every key under the configured namespace. Keys under other
    /// prefixes are untouched.
    pub async fn clear(&self) {
        if !self.enabled {
            return;
        }

        let pattern = format!("{}:*", self.prefix);
        match self.bounded(self.store.del_matching(&pattern)).await {
            Ok(removed) => debug!(pattern = %pattern, removed, "cleared namespace"),
            Err(e) => warn!(op = "clear", pattern = %pattern, error = %e, "store clear failed"),
        }
    }

    // == Timeout Bound ==
    /// Bounds a store round-trip by the configured operation timeout. A
    /// timed-out call is reported as a store failure, never as a hang.
    async fn bounded<T>(&self, fut: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.op_timeout.as_millis() as u64)),
        }
    }
}
