//! Redis Store Backend
//!
//! Production implementation of `StoreBackend` over a multiplexed async
//! Redis connection. Connection establishment retries with capped
//! exponential backoff; once connected, the `ConnectionManager` reconnects
//! on its own after transient failures. Per-call timeouts are applied by
//! the cache service, which treats a timeout like any other store failure.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{KeyTtl, StoreBackend};

/// First retry delay when connecting to the store.
pub const INITIAL_BACKOFF_MS: u64 = 100;

/// Ceiling for the connect retry delay.
pub const MAX_BACKOFF_MS: u64 = 5_000;

// == Redis Store ==
/// Redis-backed store adapter.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connects to the store at `url`, retrying up to `max_attempts` times
    /// with exponential backoff capped at `MAX_BACKOFF_MS`.
    pub async fn connect(url: &str, max_attempts: u32) -> StoreResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::Connection(format!("invalid store url: {e}")))?;

        let mut backoff = INITIAL_BACKOFF_MS;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match ConnectionManager::new(client.clone()).await {
                Ok(conn) => {
                    info!(url, attempt, "connected to cache store");
                    return Ok(Self { conn });
                }
                Err(e) if attempt < max_attempts => {
                    warn!(
                        url,
                        attempt,
                        backoff_ms = backoff,
                        error = %e,
                        "store connection failed, retrying"
                    );
                    tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF_MS);
                }
                Err(e) => {
                    return Err(StoreError::Connection(format!(
                        "giving up after {attempt} attempts: {e}"
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl StoreBackend for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn del_matching(&self, pattern: &str) -> StoreResult<usize> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }

        let removed: i64 = conn.del(&keys).await?;
        Ok(removed as usize)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl> {
        let mut conn = self.conn.clone();
        // Wire convention: -2 = absent, -1 = no expiry
        let ttl: i64 = conn.ttl(key).await?;
        Ok(match ttl {
            -2 => KeyTtl::Absent,
            -1 => KeyTtl::NoExpiry,
            secs => KeyTtl::Remaining(secs.max(0) as u64),
        })
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1i64).await?;
        Ok(value)
    }

    async fn decr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.decr(key, 1i64).await?;
        Ok(value)
    }

    async fn key_count(&self) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        let count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(count)
    }

    async fn memory_usage(&self) -> StoreResult<Option<u64>> {
        let mut conn = self.conn.clone();
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await?;
        Ok(parse_used_memory(&info))
    }
}

/// Extracts `used_memory` from an INFO memory section.
fn parse_used_memory(info: &str) -> Option<u64> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory:"))
        .and_then(|v| v.trim().parse().ok())
}
