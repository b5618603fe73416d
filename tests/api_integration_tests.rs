//! Integration Tests for the Operational API
//!
//! Tests the full request/response cycle for each endpoint against a
//! memory-backed cache runtime.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use lexcache::api::create_router;
use lexcache::cache::{CacheOptions, CacheService};
use lexcache::config::Config;
use lexcache::store::MemoryStore;
use lexcache::tasks::{CacheWarmer, QuerySource, ReferenceDataSource, WarmEntry, WarmSource};
use lexcache::AppState;

// == Helper Functions ==

fn test_config() -> Config {
    Config {
        key_prefix: "itest".to_string(),
        ..Config::default()
    }
}

fn create_test_app_with_sources(sources: Vec<Arc<dyn WarmSource>>) -> (Router, Arc<CacheService>) {
    let service = Arc::new(CacheService::new(
        Arc::new(MemoryStore::new()),
        &test_config(),
    ));
    let warmer = Arc::new(CacheWarmer::new(service.clone(), sources, true));
    let app = create_router(AppState::new(service.clone(), warmer));
    (app, service)
}

fn create_test_app() -> (Router, Arc<CacheService>) {
    create_test_app_with_sources(vec![Arc::new(ReferenceDataSource::new())])
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint_reports_cache_state() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["cache_enabled"], true);
    assert!(json.get("timestamp").is_some());
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_reflects_hits_and_misses() {
    let (app, service) = create_test_app();
    let opts = CacheOptions::default();

    service.set("hot", &json!({"id": 1}), Some(60), &opts).await;
    let _: Option<Value> = service.get("hot", &opts).await;
    let _: Option<Value> = service.get("hot", &opts).await;
    let _: Option<Value> = service.get("cold", &opts).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 2);
    assert_eq!(json["misses"], 1);
    let hit_rate = json["hit_rate"].as_f64().unwrap();
    assert!((hit_rate - 66.666).abs() < 0.01);
    assert_eq!(json["most_accessed"][0]["key"], "itest:hot");
}

#[tokio::test]
async fn test_stats_reset_endpoint() {
    let (app, service) = create_test_app();
    let _: Option<Value> = service.get("missing", &CacheOptions::default()).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/stats/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["misses"], 0);
}

// == Warm Endpoint Tests ==

#[tokio::test]
async fn test_warm_endpoint_populates_reference_data() {
    let (app, service) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/warm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sources_failed"], 0);
    assert!(json["entries_warmed"].as_u64().unwrap() >= 2);

    assert!(
        service
            .exists("reference:specializations", &CacheOptions::default())
            .await
    );
}

#[tokio::test]
async fn test_warm_endpoint_reports_failed_sources() {
    let broken: Arc<dyn WarmSource> = Arc::new(QuerySource::new("popular", Some(60), || async {
        Err(anyhow::anyhow!("query collaborator offline"))
    }));
    let working: Arc<dyn WarmSource> = Arc::new(QuerySource::new("profiles", Some(60), || async {
        Ok(vec![WarmEntry::new("lawyer:top", json!([{"id": 7}]))])
    }));
    let (app, service) = create_test_app_with_sources(vec![broken, working]);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/warm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sources_failed"], 1);
    assert_eq!(json["entries_warmed"], 1);

    // One broken collaborator must not block the others
    assert!(service.exists("lawyer:top", &CacheOptions::default()).await);
}

#[tokio::test]
async fn test_clear_and_warm_endpoint_refreshes() {
    let (app, service) = create_test_app();
    let opts = CacheOptions::default();
    service.set("stale:entry", &json!("old"), Some(600), &opts).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/clear-and-warm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!service.exists("stale:entry", &opts).await);
    assert!(service.exists("reference:specializations", &opts).await);
}

// == Invalidation Endpoint Tests ==

#[tokio::test]
async fn test_invalidate_endpoint_removes_matching_keys() {
    let (app, service) = create_test_app();
    let opts = CacheOptions::default();
    service.set("lawyers:1", &json!(1), Some(60), &opts).await;
    service.set("lawyers:2", &json!(2), Some(60), &opts).await;
    service.set("disputes:1", &json!(3), Some(60), &opts).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"pattern":"lawyers:*"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 2);

    assert!(!service.exists("lawyers:1", &opts).await);
    assert!(service.exists("disputes:1", &opts).await);
}

#[tokio::test]
async fn test_invalidate_endpoint_rejects_empty_pattern() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"pattern":"   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

// == Key Deletion Tests ==

#[tokio::test]
async fn test_delete_key_endpoint() {
    let (app, service) = create_test_app();
    let opts = CacheOptions::default();
    service.set("doomed", &json!(1), Some(60), &opts).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/keys/doomed")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!service.exists("doomed", &opts).await);
}

#[tokio::test]
async fn test_flush_endpoint_clears_namespace() {
    let (app, service) = create_test_app();
    let opts = CacheOptions::default();
    let foreign = CacheOptions::with_prefix("other");
    service.set("a", &json!(1), Some(60), &opts).await;
    service.set("b", &json!(2), Some(60), &foreign).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/flush")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!service.exists("a", &opts).await);
    // Only the configured namespace is flushed
    assert!(service.exists("b", &foreign).await);
}
