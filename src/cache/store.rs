//! Cache storage.
//!
//! `CacheStore` is the seam the orchestrator talks to; `MemoryStore` is the
//! in-process implementation: an LRU of `CacheKey -> CacheEntry` with expiry
//! checked on every read.
//!
//! Entries only leave a store through `remove`, capacity eviction or
//! `purge_expired`, and the latter two hand the dropped keys back so callers
//! tracking keys can forget them.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use metrics::counter;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::CacheKey;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Lifetime of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// The entry lives until it is removed, overwritten or evicted.
    Never,
    /// The entry expires once the duration has elapsed after the write.
    After(Duration),
}

impl Ttl {
    pub const fn seconds(seconds: u64) -> Self {
        Self::After(Duration::from_secs(seconds))
    }

    fn deadline(self, now: Instant) -> Option<Instant> {
        match self {
            Ttl::Never => None,
            Ttl::After(duration) => Some(now + duration),
        }
    }
}

/// A stored value with its absolute expiry instant.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Ttl) -> Self {
        Self {
            value,
            expires_at: ttl.deadline(Instant::now()),
        }
    }

    pub fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache store exhausted: {0}")]
    Exhausted(String),
}

/// Key-value storage used by the cache-aside orchestrator.
///
/// Implementations must be safe for concurrent callers and must never hand
/// back an expired entry.
#[async_trait]
pub trait CacheStore<V>: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<V>, CacheStoreError>;

    /// Write `value`, returning any other keys dropped to make room.
    async fn set(
        &self,
        key: CacheKey,
        value: V,
        ttl: Ttl,
    ) -> Result<Vec<CacheKey>, CacheStoreError>;

    async fn remove(&self, key: &CacheKey) -> Result<(), CacheStoreError>;

    /// Drop expired entries and return their keys.
    async fn purge_expired(&self) -> Result<Vec<CacheKey>, CacheStoreError> {
        Ok(Vec::new())
    }
}

/// In-process LRU store with lazy expiry.
pub struct MemoryStore<V> {
    entries: RwLock<LruCache<CacheKey, CacheEntry<V>>>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new store with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.capacity_non_zero())),
        }
    }

    /// Look up a live entry.
    ///
    /// An expired entry reads as absent but stays in place until it is
    /// overwritten, evicted or purged, so every removal is reported.
    pub fn get_live(&self, key: &CacheKey) -> Option<V> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let live = entries.peek(key).map(|entry| entry.is_live(now))?;
        if live {
            return entries.get(key).map(|entry| entry.value().clone());
        }

        counter!("hotelier_cache_expired_total", "kind" => key.kind().as_str()).increment(1);
        None
    }

    /// Write an entry; returns the key evicted to stay within capacity, if any.
    pub fn insert(&self, key: CacheKey, value: V, ttl: Ttl) -> Option<CacheKey> {
        let evicted = rw_write(&self.entries, SOURCE, "set")
            .push(key.clone(), CacheEntry::new(value, ttl))
            .map(|(evicted_key, _)| evicted_key)
            .filter(|evicted_key| *evicted_key != key)?;

        debug!(key = %evicted, "evicted cache entry at capacity");
        counter!("hotelier_cache_evict_total", "kind" => evicted.kind().as_str()).increment(1);
        Some(evicted)
    }

    pub fn delete(&self, key: &CacheKey) -> bool {
        rw_write(&self.entries, SOURCE, "remove").pop(key).is_some()
    }

    /// Drop every expired entry and return the removed keys.
    pub fn purge_expired(&self) -> Vec<CacheKey> {
        let now = Instant::now();
        let mut entries = rw_write(&self.entries, SOURCE, "purge_expired");
        let expired: Vec<CacheKey> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key);
        }
        expired
    }

    /// Get the number of stored entries, live or not yet purged.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<V> CacheStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &CacheKey) -> Result<Option<V>, CacheStoreError> {
        Ok(self.get_live(key))
    }

    async fn set(
        &self,
        key: CacheKey,
        value: V,
        ttl: Ttl,
    ) -> Result<Vec<CacheKey>, CacheStoreError> {
        Ok(self.insert(key, value, ttl).into_iter().collect())
    }

    async fn remove(&self, key: &CacheKey) -> Result<(), CacheStoreError> {
        self.delete(key);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<Vec<CacheKey>, CacheStoreError> {
        Ok(MemoryStore::purge_expired(self))
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::time::Duration;

    use super::*;
    use crate::cache::keys::ResourceKind;

    const FLOOR: ResourceKind = ResourceKind::new("floor");

    fn store(capacity: usize) -> MemoryStore<String> {
        MemoryStore::new(&CacheConfig {
            capacity,
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_live_until_deadline() {
        let store = store(8);
        let key = CacheKey::entity(FLOOR, 1);

        store.insert(key.clone(), "one".to_string(), Ttl::seconds(10));
        tokio::time::advance(Duration::from_millis(9_999)).await;
        assert_eq!(store.get_live(&key).as_deref(), Some("one"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(store.get_live(&key).is_none());
        assert_eq!(store.len(), 1, "expired entry waits for the sweep");
        assert_eq!(store.purge_expired(), vec![key]);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn never_expiring_entry_survives() {
        let store = store(8);
        let key = CacheKey::entity(FLOOR, 1);

        store.insert(key.clone(), "one".to_string(), Ttl::Never);
        tokio::time::advance(Duration::from_secs(86_400)).await;
        assert_eq!(store.get_live(&key).as_deref(), Some("one"));
    }

    #[tokio::test(start_paused = true)]
    async fn purge_removes_only_expired_entries() {
        let store = store(8);
        let short = CacheKey::entity(FLOOR, 1);
        let long = CacheKey::entity(FLOOR, 2);

        store.insert(short.clone(), "short".to_string(), Ttl::seconds(1));
        store.insert(long.clone(), "long".to_string(), Ttl::seconds(60));
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(store.purge_expired(), vec![short]);
        assert_eq!(store.len(), 1);
        assert!(store.get_live(&long).is_some());
    }

    #[test]
    fn lru_eviction_drops_least_recent() {
        let store = store(2);
        let first = CacheKey::entity(FLOOR, 1);
        let second = CacheKey::entity(FLOOR, 2);
        let third = CacheKey::entity(FLOOR, 3);

        store.insert(first.clone(), "1".to_string(), Ttl::Never);
        store.insert(second.clone(), "2".to_string(), Ttl::Never);
        assert!(store.get_live(&first).is_some());

        assert_eq!(
            store.insert(third.clone(), "3".to_string(), Ttl::Never),
            Some(second.clone())
        );

        assert!(store.get_live(&first).is_some());
        assert!(store.get_live(&second).is_none()); // Evicted
        assert!(store.get_live(&third).is_some());
    }

    #[test]
    fn overwrite_replaces_whole_entry() {
        let store = store(2);
        let key = CacheKey::entity(FLOOR, 1);

        store.insert(key.clone(), "old".to_string(), Ttl::Never);
        assert_eq!(store.insert(key.clone(), "new".to_string(), Ttl::Never), None);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_live(&key).as_deref(), Some("new"));
    }

    #[test]
    fn delete_reports_presence() {
        let store = store(2);
        let key = CacheKey::entity(FLOOR, 1);

        assert!(!store.delete(&key));
        store.insert(key.clone(), "1".to_string(), Ttl::Never);
        assert!(store.delete(&key));
        assert!(store.get_live(&key).is_none());
    }

    #[test]
    fn store_recovers_from_poisoned_lock() {
        let store = store(2);

        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = store
                .entries
                .write()
                .expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        let key = CacheKey::entity(FLOOR, 1);
        store.insert(key.clone(), "1".to_string(), Ttl::Never);
        assert!(store.get_live(&key).is_some());
    }
}
