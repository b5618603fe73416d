//! In-Memory Store Backend
//!
//! A process-local stand-in for the remote key-value store, used by tests
//! and single-node development. Implements the same expiry semantics the
//! remote store applies server-side: entries carry an absolute expiration
//! timestamp and are treated as absent once it passes.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyTtl, StoreBackend};

// == Stored Entry ==
#[derive(Debug, Clone)]
struct Entry {
    /// The raw stored value
    value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl Entry {
    fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        let expires_at = ttl_seconds.map(|ttl| current_timestamp_ms() + ttl * 1000);
        Self { value, expires_at }
    }

    /// An entry is expired once the current time reaches its expiration time.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    fn ttl_remaining(&self) -> KeyTtl {
        match self.expires_at {
            None => KeyTtl::NoExpiry,
            Some(expires) => {
                let now = current_timestamp_ms();
                if expires > now {
                    KeyTtl::Remaining((expires - now) / 1000)
                } else {
                    KeyTtl::Absent
                }
            }
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Memory Store ==
/// In-memory `StoreBackend` with TTL expiration and glob pattern deletion.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Returns true if the store holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// == Glob Matching ==
/// Matches a key against a glob pattern where `*` spans any run of
/// characters. Every non-`*` character matches literally.
pub(crate) fn glob_matches(pattern: &str, key: &str) -> bool {
    let segments: Vec<&str> = pattern.split('*').collect();
    if segments.len() == 1 {
        return pattern == key;
    }

    let mut rest = key;

    // First segment is anchored at the start
    let first = segments[0];
    if !rest.starts_with(first) {
        return false;
    }
    rest = &rest[first.len()..];

    // Middle segments may float; last segment is anchored at the end
    let (middle, last) = segments[1..].split_at(segments.len() - 2);
    for segment in middle {
        match rest.find(segment) {
            Some(idx) => rest = &rest[idx + segment.len()..],
            None => return false,
        }
    }
    rest.ends_with(last[0])
}

#[async_trait]
impl StoreBackend for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), Entry::new(value.to_string(), Some(ttl_seconds)));
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }

    async fn del_matching(&self, pattern: &str) -> StoreResult<usize> {
        let mut entries = self.entries.write().await;
        let matching: Vec<String> = entries
            .keys()
            .filter(|k| glob_matches(pattern, k))
            .cloned()
            .collect();

        let count = matching.len();
        for key in matching {
            entries.remove(&key);
        }
        Ok(count)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).is_some_and(|e| !e.is_expired()))
    }

    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(entry.ttl_remaining()),
            _ => Ok(KeyTtl::Absent),
        }
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        self.adjust(key, 1).await
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        self.adjust(key, -1).await
    }

    async fn key_count(&self) -> StoreResult<u64> {
        Ok(self.len().await as u64)
    }

    async fn memory_usage(&self) -> StoreResult<Option<u64>> {
        let entries = self.entries.read().await;
        let bytes: u64 = entries
            .iter()
            .map(|(k, e)| (k.len() + e.value.len()) as u64)
            .sum();
        Ok(Some(bytes))
    }
}

impl MemoryStore {
    /// Shared INCR/DECR path. Counters are stored as integer strings, the
    /// same convention the remote store applies.
    async fn adjust(&self, key: &str, delta: i64) -> StoreResult<i64> {
        let mut entries = self.entries.write().await;

        // Counters created on an absent (or expired) key persist without expiry
        let (current, expires_at) = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let current = entry
                    .value
                    .parse::<i64>()
                    .map_err(|e| StoreError::Value(format!("not an integer: {e}")))?;
                (current, entry.expires_at)
            }
            _ => (0, None),
        };

        let next = current + delta;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set_ex("k1", "v1", 300).await.unwrap();

        assert_eq!(store.get("k1").await.unwrap(), Some("v1".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let store = MemoryStore::new();
        store.set_ex("k1", "v1", 1).await.unwrap();

        assert!(store.exists("k1").await.unwrap());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.get("k1").await.unwrap(), None);
        assert!(!store.exists("k1").await.unwrap());
        assert_eq!(store.ttl("k1").await.unwrap(), KeyTtl::Absent);
    }

    #[tokio::test]
    async fn test_del() {
        let store = MemoryStore::new();
        store.set_ex("k1", "v1", 300).await.unwrap();

        assert!(store.del("k1").await.unwrap());
        assert!(!store.del("k1").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_del_matching_scoped() {
        let store = MemoryStore::new();
        store.set_ex("user:1", "a", 300).await.unwrap();
        store.set_ex("user:2", "b", 300).await.unwrap();
        store.set_ex("user:3", "c", 300).await.unwrap();
        store.set_ex("post:1", "d", 300).await.unwrap();

        let removed = store.del_matching("user:*").await.unwrap();
        assert_eq!(removed, 3);
        assert!(store.exists("post:1").await.unwrap());
        assert!(!store.exists("user:1").await.unwrap());
    }

    #[tokio::test]
    async fn test_incr_decr() {
        let store = MemoryStore::new();

        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.incr("counter").await.unwrap(), 3);

        store.set_ex("seeded", "10", 300).await.unwrap();
        assert_eq!(store.decr("seeded").await.unwrap(), 9);
        assert_eq!(store.decr("seeded").await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_incr_non_integer_fails() {
        let store = MemoryStore::new();
        store.set_ex("k", "not-a-number", 300).await.unwrap();

        assert!(store.incr("k").await.is_err());
    }

    #[tokio::test]
    async fn test_ttl_remaining() {
        let store = MemoryStore::new();
        store.set_ex("k1", "v1", 10).await.unwrap();

        match store.ttl("k1").await.unwrap() {
            KeyTtl::Remaining(secs) => assert!(secs <= 10),
            other => panic!("expected Remaining, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_memory_usage_reported() {
        let store = MemoryStore::new();
        store.set_ex("k1", "v1", 300).await.unwrap();

        let usage = store.memory_usage().await.unwrap();
        assert!(usage.unwrap() > 0);
    }

    #[test]
    fn test_glob_matches() {
        assert!(glob_matches("user:*", "user:1"));
        assert!(glob_matches("user:*", "user:"));
        assert!(!glob_matches("user:*", "post:1"));
        assert!(glob_matches("*", "anything"));
        assert!(glob_matches("lawyer:*:profile", "lawyer:42:profile"));
        assert!(!glob_matches("lawyer:*:profile", "lawyer:42:reviews"));
        assert!(glob_matches("exact", "exact"));
        assert!(!glob_matches("exact", "exact-no"));
    }
}
