//! Cache Statistics Module
//!
//! Tracks in-process cache performance metrics: hits, misses, and per-key
//! access counts. Counters live for the process lifetime and are reset only
//! by an explicit call.

use std::collections::HashMap;

use serde::Serialize;

/// How many of the hottest keys a stats snapshot reports.
pub const MOST_ACCESSED_LIMIT: usize = 10;

// == Access Count ==
/// A cached key and how many times it has been served from cache.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyAccess {
    pub key: String,
    pub count: u64,
}

// == Stats Recorder ==
/// Mutable hit/miss bookkeeping owned by the cache service.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: u64,
    misses: u64,
    key_access: HashMap<String, u64>,
}

impl StatsRecorder {
    /// Creates a recorder with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a cache hit for `key`.
    pub fn record_hit(&mut self, key: &str) {
        self.hits += 1;
        *self.key_access.entry(key.to_string()).or_insert(0) += 1;
    }

    /// Records a cache miss.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Zeroes all counters and the access-count map.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.key_access.clear();
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Hit rate as a percentage, 0.0 when no gets have been observed.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }

    /// The most frequently served keys, hottest first, capped at
    /// `MOST_ACCESSED_LIMIT`.
    pub fn most_accessed(&self) -> Vec<KeyAccess> {
        let mut entries: Vec<KeyAccess> = self
            .key_access
            .iter()
            .map(|(key, count)| KeyAccess {
                key: key.clone(),
                count: *count,
            })
            .collect();

        // Tie-break on key so snapshots are deterministic
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
        entries.truncate(MOST_ACCESSED_LIMIT);
        entries
    }
}

// == Cache Stats Snapshot ==
/// Point-in-time statistics combining in-process counters with live store
/// introspection.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of gets served from cache
    pub hits: u64,
    /// Number of gets that fell through to the underlying handler
    pub misses: u64,
    /// Hit rate as a percentage
    pub hit_rate: f64,
    /// Total keys currently held by the store
    pub total_keys: u64,
    /// Store memory usage in bytes, when the backend reports it
    pub memory_used_bytes: Option<u64>,
    /// Hottest cached keys, most accessed first
    pub most_accessed: Vec<KeyAccess>,
}
