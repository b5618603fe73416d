//! Tag Registry Module
//!
//! The registration table mapping operation ids to their tag sets. Populated
//! once at startup by the host backend and consulted by the interceptor as a
//! plain table lookup at dispatch time.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::cache::tags::OperationTags;

// == Tag Registry ==
/// operation id -> tag set.
///
/// Registration happens during startup wiring; lookups dominate afterwards.
#[derive(Default)]
pub struct TagRegistry {
    tags: RwLock<HashMap<String, OperationTags>>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the tag set for `operation_id`, replacing any previous set.
    ///
    /// Default key derivation folds in route and query parameters but not
    /// caller identity; operations whose responses are caller-specific must
    /// register an explicit key function that includes the caller, or two
    /// callers issuing the same path+query will share one entry.
    pub fn register(&self, operation_id: impl Into<String>, tags: OperationTags) {
        self.tags.write().unwrap().insert(operation_id.into(), tags);
    }

    /// Looks up the tag set for `operation_id`.
    pub fn lookup(&self, operation_id: &str) -> Option<OperationTags> {
        self.tags.read().unwrap().get(operation_id).cloned()
    }

    /// Number of registered operations.
    pub fn len(&self) -> usize {
        self.tags.read().unwrap().len()
    }

    /// Returns true when no operations are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
