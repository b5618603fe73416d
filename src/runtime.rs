//! Runtime Module
//!
//! Explicit lifecycle for the caching layer: the cache service is built
//! once from configuration at process start, warmed, and shut down
//! explicitly. Nothing here is reachable through global state; the host
//! injects the runtime's service wherever caching is needed.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::CacheService;
use crate::config::Config;
use crate::store::{MemoryStore, RedisStore, StoreBackend};
use crate::tasks::{spawn_warming_task, CacheWarmer, WarmSource};

// == Cache Runtime ==
/// The started caching layer: service singleton, warmer, and the scheduled
/// warming task.
pub struct CacheRuntime {
    pub service: Arc<CacheService>,
    pub warmer: Arc<CacheWarmer>,
    warming_task: Option<JoinHandle<()>>,
}

impl CacheRuntime {
    /// Connects to the configured store and starts the caching layer.
    ///
    /// Store connection retries with capped backoff; if the retry budget is
    /// exhausted the process stays up and the layer runs with caching
    /// disabled, since every cache operation already degrades to a
    /// miss-equivalent no-op.
    ///
    /// When warming is active, one best-effort warming run completes before
    /// this returns, so hot keys are populated before traffic arrives.
    pub async fn start(config: &Config, sources: Vec<Arc<dyn WarmSource>>) -> Self {
        let (store, effective): (Arc<dyn StoreBackend>, Config) = if !config.cache_enabled {
            // The store is never touched while disabled
            (Arc::new(MemoryStore::new()), config.clone())
        } else {
            match RedisStore::connect(&config.store_url, config.store_connect_attempts).await {
                Ok(store) => (Arc::new(store), config.clone()),
                Err(e) => {
                    error!(error = %e, "cache store unreachable, running with caching disabled");
                    let mut degraded = config.clone();
                    degraded.cache_enabled = false;
                    (Arc::new(MemoryStore::new()), degraded)
                }
            }
        };

        Self::start_with_store(store, &effective, sources).await
    }

    /// Starts the caching layer over an already-constructed store backend.
    ///
    /// Used by tests and by hosts that manage their own store connection.
    pub async fn start_with_store(
        store: Arc<dyn StoreBackend>,
        config: &Config,
        sources: Vec<Arc<dyn WarmSource>>,
    ) -> Self {
        let service = Arc::new(CacheService::new(store, config));
        let warmer = Arc::new(CacheWarmer::new(
            service.clone(),
            sources,
            config.warming_enabled,
        ));

        let warming_task = if warmer.is_enabled() {
            let report = warmer.warm_cache().await;
            info!(
                entries = report.entries_warmed,
                failed_sources = report.sources_failed,
                "initial cache warming complete"
            );
            Some(spawn_warming_task(warmer.clone(), config.warming_interval))
        } else {
            info!("cache warming inactive");
            None
        };

        Self {
            service,
            warmer,
            warming_task,
        }
    }

    /// Stops the scheduled warming task. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(task) = self.warming_task.take() {
            task.abort();
            info!("scheduled warming task stopped");
        }
    }
}

impl Drop for CacheRuntime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
