//! Operation Tags Module
//!
//! The four declarative tags an operation can carry: cache-key, cache-ttl,
//! cache-invalidate, and no-cache. Tags are pure metadata attached at
//! registration time; all behavior lives in the interceptor.
//!
//! Key and invalidation functions are pure functions of a minimal request
//! descriptor, so they stay independent of any HTTP framework's request
//! object shape.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

/// Reserved query flag that requests a cache bypass for a single call.
///
/// Accepted values: `1` or `true`. The flag never participates in derived
/// cache keys.
pub const BYPASS_QUERY_FLAG: &str = "nocache";

// == Request Context ==
/// Normalized descriptor of an intercepted operation's request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    /// Route parameters by name, e.g. `id` -> `42`
    pub route_params: BTreeMap<String, String>,
    /// Query parameters by name
    pub query_params: BTreeMap<String, String>,
}

impl RequestContext {
    /// Creates a context with no parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            route_params: BTreeMap::new(),
            query_params: BTreeMap::new(),
        }
    }

    /// Shorthand for a GET request context.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn with_route_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_params.insert(name.into(), value.into());
        self
    }

    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Reads are GET/HEAD; everything else is treated as a mutation.
    pub fn is_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }

    /// Whether the request carries the reserved bypass flag.
    pub fn bypass_requested(&self) -> bool {
        matches!(
            self.query_params.get(BYPASS_QUERY_FLAG).map(String::as_str),
            Some("1") | Some("true")
        )
    }
}

// == Tag Function Types ==
/// Derives a cache key from the request descriptor.
pub type KeyFn = Arc<dyn Fn(&RequestContext) -> String + Send + Sync>;

/// Derives invalidation patterns from the request descriptor.
pub type InvalidateFn = Arc<dyn Fn(&RequestContext) -> Vec<String> + Send + Sync>;

// == Key Spec ==
/// The cache-key tag: a literal key or a derivation function.
#[derive(Clone)]
pub enum KeySpec {
    Literal(String),
    Derived(KeyFn),
}

impl KeySpec {
    pub fn resolve(&self, ctx: &RequestContext) -> String {
        match self {
            KeySpec::Literal(key) => key.clone(),
            KeySpec::Derived(f) => f(ctx),
        }
    }
}

impl fmt::Debug for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::Literal(key) => f.debug_tuple("Literal").field(key).finish(),
            KeySpec::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

// == Invalidate Spec ==
/// The cache-invalidate tag: one pattern, several, or a derivation function.
#[derive(Clone)]
pub enum InvalidateSpec {
    Pattern(String),
    Patterns(Vec<String>),
    Derived(InvalidateFn),
}

impl InvalidateSpec {
    pub fn resolve(&self, ctx: &RequestContext) -> Vec<String> {
        match self {
            InvalidateSpec::Pattern(p) => vec![p.clone()],
            InvalidateSpec::Patterns(ps) => ps.clone(),
            InvalidateSpec::Derived(f) => f(ctx),
        }
    }
}

impl fmt::Debug for InvalidateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidateSpec::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            InvalidateSpec::Patterns(ps) => f.debug_tuple("Patterns").field(ps).finish(),
            InvalidateSpec::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

// == Operation Tags ==
/// The tag set attached to one operation. Registered once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct OperationTags {
    /// cache-key: overrides default key derivation
    pub key: Option<KeySpec>,
    /// cache-ttl: overrides the default expiry in seconds
    pub ttl: Option<u64>,
    /// cache-invalidate: patterns purged after the operation succeeds
    pub invalidate: Option<InvalidateSpec>,
    /// no-cache: disables both caching and invalidation
    pub no_cache: bool,
}

impl OperationTags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a literal cache key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(KeySpec::Literal(key.into()));
        self
    }

    /// Sets a key derivation function.
    pub fn key_fn(mut self, f: impl Fn(&RequestContext) -> String + Send + Sync + 'static) -> Self {
        self.key = Some(KeySpec::Derived(Arc::new(f)));
        self
    }

    /// Sets the TTL override in seconds.
    pub fn ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    /// Declares a single invalidation pattern.
    pub fn invalidate(mut self, pattern: impl Into<String>) -> Self {
        self.invalidate = Some(InvalidateSpec::Pattern(pattern.into()));
        self
    }

    /// Declares several invalidation patterns.
    pub fn invalidate_all(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.invalidate = Some(InvalidateSpec::Patterns(
            patterns.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Sets an invalidation derivation function.
    pub fn invalidate_fn(
        mut self,
        f: impl Fn(&RequestContext) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.invalidate = Some(InvalidateSpec::Derived(Arc::new(f)));
        self
    }

    /// Disables caching and invalidation for this operation.
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }
}
