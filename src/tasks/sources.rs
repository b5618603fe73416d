//! Warming Sources
//!
//! Concrete warming routines. `QuerySource` adapts any business query
//! collaborator (popular queries, top lawyer profiles) into a warm source;
//! `ReferenceDataSource` warms the static, slow-changing reference data the
//! marketplace serves on every search form.

use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;

use crate::tasks::warmer::{WarmEntry, WarmSource};

// == Query Source ==
type Loader = Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Vec<WarmEntry>>> + Send + Sync>;

/// A warming routine backed by an arbitrary async loader.
///
/// The loader typically wraps a business query collaborator, e.g. the
/// popular-search query or the top-rated lawyer profiles query.
pub struct QuerySource {
    name: String,
    ttl: Option<u64>,
    loader: Loader,
}

impl QuerySource {
    pub fn new<F, Fut>(name: impl Into<String>, ttl: Option<u64>, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Vec<WarmEntry>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            ttl,
            loader: Box::new(move || loader().boxed()),
        }
    }
}

#[async_trait]
impl WarmSource for QuerySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Option<u64> {
        self.ttl
    }

    async fn load(&self) -> anyhow::Result<Vec<WarmEntry>> {
        (self.loader)().await
    }
}

// == Reference Data Source ==
/// TTL for reference data; it changes rarely, so it outlives the scheduled
/// warming interval by a wide margin.
const REFERENCE_TTL: u64 = 3_600;

/// Warms the static reference catalog: legal specializations and
/// consultation settings defaults.
#[derive(Debug, Default)]
pub struct ReferenceDataSource;

impl ReferenceDataSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WarmSource for ReferenceDataSource {
    fn name(&self) -> &str {
        "reference-data"
    }

    fn ttl(&self) -> Option<u64> {
        Some(REFERENCE_TTL)
    }

    async fn load(&self) -> anyhow::Result<Vec<WarmEntry>> {
        let specializations = json!([
            "ДТП",
            "Семейное право",
            "Трудовое право",
            "Недвижимость",
            "Уголовное право",
            "Налоговое право",
            "Защита прав потребителей",
            "Миграционное право",
        ]);

        let consultation_settings = json!({
            "durations_minutes": [15, 30, 60],
            "currency": "UAH",
            "refund_window_hours": 24,
            "dispute_window_hours": 72,
        });

        Ok(vec![
            WarmEntry::new("reference:specializations", specializations),
            WarmEntry::new("reference:consultation-settings", consultation_settings),
        ])
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_query_source_invokes_loader() {
        let source = QuerySource::new("popular", Some(120), || async {
            Ok(vec![WarmEntry::new("popular:lawyers", json!(["Иванов"]))])
        });

        assert_eq!(source.name(), "popular");
        assert_eq!(source.ttl(), Some(120));

        let entries = source.load().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "popular:lawyers");
    }

    #[tokio::test]
    async fn test_reference_data_keys() {
        let source = ReferenceDataSource::new();
        let entries = source.load().await.unwrap();

        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert!(keys.contains(&"reference:specializations"));
        assert!(keys.contains(&"reference:consultation-settings"));
        assert_eq!(source.ttl(), Some(REFERENCE_TTL));
    }

    #[tokio::test]
    async fn test_reference_specializations_non_empty() {
        let entries = ReferenceDataSource::new().load().await.unwrap();
        let specs = &entries[0].value;
        assert!(specs.as_array().unwrap().len() > 3);
    }
}
