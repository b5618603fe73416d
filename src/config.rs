//! Configuration Module
//!
//! Handles loading and managing the caching layer configuration from
//! environment variables.

use std::env;

/// Caching layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Master switch: when false every cache operation is an inert no-op
    pub cache_enabled: bool,
    /// Default TTL in seconds for entries without an explicit TTL
    pub default_ttl: u64,
    /// Namespace prefix prepended to every logical key
    pub key_prefix: String,
    /// Connection URL of the backing key-value store
    pub store_url: String,
    /// Upper bound in milliseconds for any single store round-trip
    pub store_timeout_ms: u64,
    /// Maximum connection attempts before giving up on the store
    pub store_connect_attempts: u32,
    /// Whether startup/scheduled cache warming runs
    pub warming_enabled: bool,
    /// Interval in seconds between scheduled warming runs
    pub warming_interval: u64,
    /// HTTP port of the operational API
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_ENABLED` - Master cache switch (default: true)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_KEY_PREFIX` - Key namespace prefix (default: "lexcache")
    /// - `STORE_URL` - Store connection URL (default: "redis://127.0.0.1:6379")
    /// - `STORE_TIMEOUT_MS` - Per-call store timeout (default: 2000)
    /// - `STORE_CONNECT_ATTEMPTS` - Connection retry budget (default: 5)
    /// - `CACHE_WARMING_ENABLED` - Warming switch (default: true)
    /// - `CACHE_WARMING_INTERVAL` - Warming interval in seconds (default: 300)
    /// - `SERVER_PORT` - Operational API port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            default_ttl: env::var("CACHE_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or_else(|_| "lexcache".to_string()),
            store_url: env::var("STORE_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            store_timeout_ms: env::var("STORE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2000),
            store_connect_attempts: env::var("STORE_CONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            warming_enabled: env::var("CACHE_WARMING_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            warming_interval: env::var("CACHE_WARMING_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            default_ttl: 300,
            key_prefix: "lexcache".to_string(),
            store_url: "redis://127.0.0.1:6379".to_string(),
            store_timeout_ms: 2000,
            store_connect_attempts: 5,
            warming_enabled: true,
            warming_interval: 300,
            server_port: 3000,
        }
    }
}
