//! Store Adapter Module
//!
//! Abstracts the remote key-value store behind the `StoreBackend` trait.
//! The production backend is Redis; an in-memory backend exists for tests
//! and single-node development. Any store implementing this surface
//! satisfies the caching layer's contract.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::{RedisStore, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS};

use async_trait::async_trait;

use crate::error::StoreResult;

// == Key TTL ==
/// Remaining lifetime of a stored key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist (or has expired)
    Absent,
    /// The key exists and never expires
    NoExpiry,
    /// The key exists and expires after this many seconds
    Remaining(u64),
}

// == Store Backend Trait ==
/// Operation surface required of the backing key-value store.
///
/// All operations are async and fallible; implementations are shared across
/// request handlers and the warming scheduler, so they must be `Send + Sync`
/// and must not hold locks across store round-trips.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Fetch the raw value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key` with an expiry of `ttl_seconds`.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()>;

    /// Delete a single key. Returns true if the key existed.
    async fn del(&self, key: &str) -> StoreResult<bool>;

    /// Delete every key matching a glob pattern. Returns the number removed.
    async fn del_matching(&self, pattern: &str) -> StoreResult<usize>;

    /// Check whether `key` exists and has not expired.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl>;

    /// Atomically increment the integer stored under `key`.
    ///
    /// An absent key is treated as 0, so the first increment yields 1.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Atomically decrement the integer stored under `key`.
    async fn decr(&self, key: &str) -> StoreResult<i64>;

    /// Total number of keys held by the store.
    async fn key_count(&self) -> StoreResult<u64>;

    /// Bytes of memory used by the store, when the backend can report it.
    async fn memory_usage(&self) -> StoreResult<Option<u64>>;
}
