//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify key derivation, namespacing, and statistics
//! accounting across generated inputs.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{
    default_cache_key, CacheOptions, CacheService, RequestContext, BYPASS_QUERY_FLAG,
};
use crate::config::Config;
use crate::store::MemoryStore;

// == Strategies ==
/// Generates query parameter names that cannot collide with the bypass flag.
fn param_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_filter("reserved flag", |s| s != BYPASS_QUERY_FLAG)
}

fn param_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{0,16}".prop_map(|s| s)
}

fn logical_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:_-]{1,48}".prop_map(|s| s)
}

fn test_service() -> CacheService {
    let config = Config {
        key_prefix: "prop".to_string(),
        ..Config::default()
    };
    CacheService::new(Arc::new(MemoryStore::new()), &config)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Key derivation must not depend on the order query parameters arrive in.
    #[test]
    fn prop_derived_key_order_insensitive(
        unique in prop::collection::btree_map(param_name_strategy(), param_value_strategy(), 1..8),
        seed in any::<u64>(),
    ) {
        let params: Vec<(String, String)> = unique.into_iter().collect();

        let mut forward = RequestContext::get("/lawyers");
        for (name, value) in &params {
            forward.query_params.insert(name.clone(), value.clone());
        }

        // Insert the same parameters in a rotated order
        let mut rotated = RequestContext::get("/lawyers");
        let offset = (seed as usize) % params.len();
        for (name, value) in params.iter().cycle().skip(offset).take(params.len()) {
            rotated.query_params.insert(name.clone(), value.clone());
        }

        prop_assert_eq!(default_cache_key(&forward), default_cache_key(&rotated));
    }

    // The bypass flag never participates in the derived key.
    #[test]
    fn prop_bypass_flag_never_in_key(
        params in prop::collection::vec((param_name_strategy(), param_value_strategy()), 0..6),
    ) {
        let mut plain = RequestContext::get("/consultations");
        let mut flagged = RequestContext::get("/consultations");
        for (name, value) in &params {
            plain.query_params.insert(name.clone(), value.clone());
            flagged.query_params.insert(name.clone(), value.clone());
        }
        flagged.query_params.insert(BYPASS_QUERY_FLAG.to_string(), "1".to_string());

        prop_assert_eq!(default_cache_key(&plain), default_cache_key(&flagged));
    }

    // The derived key is a pure function of the context.
    #[test]
    fn prop_derived_key_deterministic(
        route in prop::collection::btree_map(param_name_strategy(), param_value_strategy(), 0..4),
    ) {
        let mut ctx = RequestContext::get("/lawyers/detail");
        ctx.route_params = BTreeMap::from_iter(route);

        prop_assert_eq!(default_cache_key(&ctx), default_cache_key(&ctx.clone()));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Round-trip storage: any serializable value set under a key comes back
    // equal before its TTL elapses.
    #[test]
    fn prop_roundtrip_storage(key in logical_key_strategy(), value in "[a-zA-Z0-9 ]{0,64}") {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let service = test_service();
            let opts = CacheOptions::default();

            service.set(&key, &value, Some(300), &opts).await;
            let cached: Option<String> = service.get(&key, &opts).await;
            prop_assert_eq!(cached, Some(value));
            Ok(())
        })?;
    }

    // Statistics accuracy: hits and misses track exactly what get observed.
    #[test]
    fn prop_statistics_accuracy(
        stored in prop::collection::btree_map(logical_key_strategy(), param_value_strategy(), 0..10),
        probes in prop::collection::vec(logical_key_strategy(), 1..20),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let service = test_service();
            let opts = CacheOptions::default();

            for (key, value) in &stored {
                service.set(key, value, Some(300), &opts).await;
            }

            let mut expected_hits = 0u64;
            let mut expected_misses = 0u64;
            for probe in &probes {
                let cached: Option<String> = service.get(probe, &opts).await;
                if cached.is_some() {
                    expected_hits += 1;
                } else {
                    expected_misses += 1;
                }
                prop_assert_eq!(cached.is_some(), stored.contains_key(probe));
            }

            let stats = service.stats().await;
            prop_assert_eq!(stats.hits, expected_hits);
            prop_assert_eq!(stats.misses, expected_misses);
            Ok(())
        })?;
    }

    // Namespacing: values stored under different prefixes never collide.
    #[test]
    fn prop_prefixes_isolate(key in logical_key_strategy()) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let service = test_service();
            let default = CacheOptions::default();
            let other = CacheOptions::with_prefix("elsewhere");

            service.set(&key, &"ours", Some(300), &default).await;
            let foreign: Option<String> = service.get(&key, &other).await;
            prop_assert_eq!(foreign, None);

            service.clear().await;
            let gone: Option<String> = service.get(&key, &default).await;
            prop_assert_eq!(gone, None);
            Ok(())
        })?;
    }
}
