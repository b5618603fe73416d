//! Cache Warming Scheduler
//!
//! Proactively populates a fixed set of hot keys so known-expensive reads
//! do not pay a cold miss. Runs once at startup, on a recurring interval,
//! and on demand via the operational API.
//!
//! Each warming routine is isolated: one failing data source is logged and
//! reported but never aborts the others, and a warming failure never blocks
//! startup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheOptions, CacheService};

// == Warm Entry ==
/// One key/value pair produced by a warming routine.
#[derive(Debug, Clone)]
pub struct WarmEntry {
    pub key: String,
    pub value: serde_json::Value,
}

impl WarmEntry {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

// == Warm Source Trait ==
/// An independent warming routine backed by a business query collaborator.
#[async_trait]
pub trait WarmSource: Send + Sync {
    /// Name used in logs and warm reports.
    fn name(&self) -> &str;

    /// TTL for entries produced by this source; None uses the service default.
    fn ttl(&self) -> Option<u64> {
        None
    }

    /// Produces the entries to cache. Errors are contained to this source.
    async fn load(&self) -> anyhow::Result<Vec<WarmEntry>>;
}

// == Warm Report ==
/// Outcome of one warming routine within a run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub entries: usize,
    pub error: Option<String>,
}

/// Outcome of one full warming run.
#[derive(Debug, Clone, Serialize, Default)]
pub struct WarmReport {
    pub entries_warmed: usize,
    pub sources_failed: usize,
    pub outcomes: Vec<SourceOutcome>,
}

// == Cache Warmer ==
/// Executes the registered warming routines against the cache service.
pub struct CacheWarmer {
    service: Arc<CacheService>,
    sources: Vec<Arc<dyn WarmSource>>,
    enabled: bool,
}

impl CacheWarmer {
    /// Creates a warmer over `sources`. Warming is active only when both
    /// the warming flag and the cache service itself are enabled.
    pub fn new(
        service: Arc<CacheService>,
        sources: Vec<Arc<dyn WarmSource>>,
        warming_enabled: bool,
    ) -> Self {
        let enabled = warming_enabled && service.is_enabled();
        Self {
            service,
            sources,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    // == Warm Cache ==
    /// Runs every warming routine concurrently, each with its own failure
    /// isolation, and reports the combined outcome.
    pub async fn warm_cache(&self) -> WarmReport {
        if !self.enabled {
            debug!("cache warming disabled, skipping run");
            return WarmReport::default();
        }

        let runs = self.sources.iter().map(|source| {
            let source = source.clone();
            async move { self.run_source(source).await }
        });
        let outcomes: Vec<SourceOutcome> = join_all(runs).await;

        let report = WarmReport {
            entries_warmed: outcomes.iter().map(|o| o.entries).sum(),
            sources_failed: outcomes.iter().filter(|o| o.error.is_some()).count(),
            outcomes,
        };
        info!(
            entries = report.entries_warmed,
            failed_sources = report.sources_failed,
            "cache warming run finished"
        );
        report
    }

    async fn run_source(&self, source: Arc<dyn WarmSource>) -> SourceOutcome {
        match source.load().await {
            Ok(entries) => {
                let opts = CacheOptions::default();
                let count = entries.len();
                for entry in entries {
                    self.service
                        .set(&entry.key, &entry.value, source.ttl(), &opts)
                        .await;
                }
                debug!(source = source.name(), entries = count, "warming source completed");
                SourceOutcome {
                    source: source.name().to_string(),
                    entries: count,
                    error: None,
                }
            }
            Err(e) => {
                warn!(source = source.name(), error = %e, "warming source failed");
                SourceOutcome {
                    source: source.name().to_string(),
                    entries: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    // == Manual Triggers ==
    /// Manual synchronous invocation of a warming run.
    pub async fn trigger_warmup(&self) -> WarmReport {
        info!("manual cache warmup triggered");
        self.warm_cache().await
    }

    /// Clears the cache namespace, then re-warms. Used to force a full
    /// refresh after a deploy or data correction.
    pub async fn clear_and_warm(&self) -> WarmReport {
        info!("clearing cache before warmup");
        self.service.clear().await;
        self.warm_cache().await
    }
}

// == Periodic Task ==
/// Spawns the recurring warming task.
///
/// The task sleeps for the configured interval between runs and is stopped
/// by aborting the returned handle during graceful shutdown. It holds no
/// lock that request-path cache operations could block on.
pub fn spawn_warming_task(warmer: Arc<CacheWarmer>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            interval_secs,
            "starting scheduled cache warming task"
        );

        loop {
            tokio::time::sleep(interval).await;
            warmer.warm_cache().await;
        }
    })
}
