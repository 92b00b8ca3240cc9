//! Collection key registry.
//!
//! Collection keys are fingerprints, so they cannot be enumerated from the
//! resource kind alone. The registry remembers every collection key written
//! through the orchestrator, grouped by kind, so a mutation can invalidate all
//! of them at once. Keys the store drops on its own (capacity eviction, expiry
//! purges) are forgotten as the store reports them, so the registry stays
//! bounded by what the store holds.

use std::collections::HashSet;

use dashmap::DashMap;

use super::keys::{CacheKey, ResourceKind};

/// Tracks resource kind → collection cache keys.
#[derive(Default)]
pub struct CollectionRegistry {
    keys: DashMap<ResourceKind, HashSet<CacheKey>>,
}

impl CollectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a collection key. Entity keys are ignored.
    pub fn register(&self, key: &CacheKey) {
        if !key.is_collection() {
            return;
        }
        self.keys
            .entry(key.kind())
            .or_default()
            .insert(key.clone());
    }

    /// Forget a single collection key.
    pub fn forget(&self, key: &CacheKey) {
        if !key.is_collection() {
            return;
        }
        if let Some(mut keys) = self.keys.get_mut(&key.kind()) {
            keys.remove(key);
        }
        self.keys.remove_if(&key.kind(), |_, keys| keys.is_empty());
    }

    /// Remove and return every collection key registered for `kind`.
    pub fn drain(&self, kind: ResourceKind) -> Vec<CacheKey> {
        self.keys
            .remove(&kind)
            .map(|(_, keys)| keys.into_iter().collect())
            .unwrap_or_default()
    }

    /// Get the number of collection keys tracked for `kind`.
    pub fn len(&self, kind: ResourceKind) -> usize {
        self.keys.get(&kind).map(|keys| keys.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, kind: ResourceKind) -> bool {
        self.len(kind) == 0
    }
}
