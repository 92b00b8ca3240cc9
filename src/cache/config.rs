//! Cache configuration.
//!
//! Controls the in-memory store size and the per-shape TTL policy via the
//! `[cache]` section of `hotelier.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use super::store::Ttl;

// Default values for cache configuration
const DEFAULT_CAPACITY: usize = 1024;
const DEFAULT_ENTITY_TTL_SECS: u64 = 60;
const DEFAULT_COLLECTION_TTL_SECS: u64 = 10;
const DEFAULT_SWEEP_INTERVAL_MS: u64 = 30_000;

/// Cache configuration from `hotelier.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the cache. When off, every read goes to the backing store.
    pub enabled: bool,
    /// Maximum entries per store before LRU eviction.
    pub capacity: usize,
    /// TTL for single-record entries; zero keeps them until invalidated.
    pub entity_ttl_seconds: u64,
    /// TTL for collection entries; the staleness bound for list results.
    pub collection_ttl_seconds: u64,
    /// Interval (ms) of the background sweep that drops expired entries.
    pub sweep_interval_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: DEFAULT_CAPACITY,
            entity_ttl_seconds: DEFAULT_ENTITY_TTL_SECS,
            collection_ttl_seconds: DEFAULT_COLLECTION_TTL_SECS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
        }
    }
}

/// TTLs applied per resource shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub entity: Ttl,
    pub collection: Ttl,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        CacheConfig::default().ttl_policy()
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        let entity = match self.entity_ttl_seconds {
            0 => Ttl::Never,
            seconds => Ttl::seconds(seconds),
        };
        TtlPolicy {
            entity,
            collection: Ttl::seconds(self.collection_ttl_seconds.max(1)),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.capacity, 1024);
        assert_eq!(config.entity_ttl_seconds, 60);
        assert_eq!(config.collection_ttl_seconds, 10);
        assert_eq!(config.sweep_interval_ms, 30_000);
    }

    #[test]
    fn collections_expire_sooner_than_entities() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.entity, Ttl::seconds(60));
        assert_eq!(policy.collection, Ttl::seconds(10));
    }

    #[test]
    fn zero_entity_ttl_means_no_expiry() {
        let config = CacheConfig {
            entity_ttl_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.ttl_policy().entity, Ttl::Never);
    }

    #[test]
    fn collection_ttl_never_disables_expiry() {
        let config = CacheConfig {
            collection_ttl_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.ttl_policy().collection, Ttl::seconds(1));
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.capacity_non_zero().get(), 1);
    }
}
