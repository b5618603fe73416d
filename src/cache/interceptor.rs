//! Cache Interceptor Module
//!
//! The request-pipeline decision procedure. For every intercepted operation
//! it consults the operation's tags and the cache service to either
//! short-circuit a read with a cached value, populate the cache after a
//! successful read, or invalidate matching keys after a successful write.
//!
//! Handler errors always propagate unchanged: the interceptor never
//! suppresses or replaces them, and never caches an error response.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::registry::TagRegistry;
use crate::cache::service::{CacheOptions, CacheService};
use crate::cache::tags::{RequestContext, BYPASS_QUERY_FLAG};

// == Default Key Derivation ==
/// Derives the cache key for an untagged read: `METHOD:path`, extended with
/// the query parameters (sorted by name, bypass flag excluded) or, when
/// there are route parameters instead, their values sorted by parameter
/// name.
pub fn default_cache_key(ctx: &RequestContext) -> String {
    let base = format!("{}:{}", ctx.method, ctx.path);

    // BTreeMap iteration is already name-sorted
    let query: Vec<String> = ctx
        .query_params
        .iter()
        .filter(|(name, _)| name.as_str() != BYPASS_QUERY_FLAG)
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if !query.is_empty() {
        return format!("{base}:{}", query.join("&"));
    }

    let route: Vec<&str> = ctx.route_params.values().map(String::as_str).collect();
    if !route.is_empty() {
        return format!("{base}:{}", route.join(":"));
    }

    base
}

// == Cache Interceptor ==
/// Wraps operation handlers with declarative caching behavior.
pub struct CacheInterceptor {
    service: Arc<CacheService>,
    registry: Arc<TagRegistry>,
}

impl CacheInterceptor {
    pub fn new(service: Arc<CacheService>, registry: Arc<TagRegistry>) -> Self {
        Self { service, registry }
    }

    /// Runs `handler` for `operation_id` under the caching decision
    /// procedure:
    ///
    /// 1. `no-cache` tag or bypass flag: run the handler untouched.
    /// 2. Mutation: run the handler first; only on success resolve the
    ///    invalidation targets and purge each pattern.
    /// 3. Read: serve a hit without running the handler; on a miss run it
    ///    and cache a non-null success under the derived key.
    pub async fn dispatch<T, E, F, Fut>(
        &self,
        operation_id: &str,
        ctx: &RequestContext,
        handler: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let tags = self.registry.lookup(operation_id).unwrap_or_default();

        if tags.no_cache || ctx.bypass_requested() {
            debug!(operation = operation_id, "cache bypassed");
            return handler().await;
        }

        if !ctx.is_read() {
            // Invalidation must wait until the mutation is durable, and
            // must not run at all if the handler fails.
            let result = handler().await?;

            if let Some(spec) = &tags.invalidate {
                let opts = CacheOptions::default();
                for pattern in spec.resolve(ctx) {
                    let removed = self.service.del_pattern(&pattern, &opts).await;
                    debug!(operation = operation_id, pattern = %pattern, removed, "invalidated after mutation");
                }
            }
            return Ok(result);
        }

        let key = match &tags.key {
            Some(spec) => spec.resolve(ctx),
            None => default_cache_key(ctx),
        };

        let opts = CacheOptions::default();
        if let Some(cached) = self.service.get::<T>(&key, &opts).await {
            debug!(operation = operation_id, key = %key, "served from cache");
            return Ok(cached);
        }

        let result = handler().await?;

        if !serializes_to_null(&result) {
            self.service.set(&key, &result, tags.ttl, &opts).await;
        }
        Ok(result)
    }
}

/// A handler result that serializes to JSON null is never cached; a null
/// entry would be indistinguishable from a miss on the next read.
fn serializes_to_null<T: Serialize>(value: &T) -> bool {
    match serde_json::to_value(value) {
        Ok(v) => v.is_null(),
        Err(_) => true,
    }
}
