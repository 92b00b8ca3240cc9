//! Cache-aside orchestration.
//!
//! Reads check the store first and fall back to a caller-supplied loader on a
//! miss, writing the loaded value back with a TTL. Mutation paths call `put`,
//! `invalidate` and `invalidate_collections` directly after the backing store
//! has committed.
//!
//! Concurrent misses on the same key are not deduplicated: each caller runs
//! its own loader and the last completed `set` wins. No lock is held while a
//! loader is awaited.
//!
//! The store is an optimization, never a source of truth. A failing `get` is
//! treated as a miss and a failing `set`/`remove` is logged and counted, but
//! neither fails the caller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::config::TtlPolicy;
use super::keys::{CacheKey, ResourceKind};
use super::registry::CollectionRegistry;
use super::store::{CacheStore, CacheStoreError, Ttl};

/// Outcome of a cache-aside read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<V> {
    /// Served from a live cache entry; the loader was not called.
    Cached(V),
    /// Loaded from the backing store and written to the cache.
    Loaded(V),
    /// The backing store confirmed there is nothing under this key.
    NotFound,
}

impl<V> Fetched<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Fetched::Cached(value) | Fetched::Loaded(value) => Some(value),
            Fetched::NotFound => None,
        }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self, Fetched::Cached(_))
    }
}

/// Read-through / write-invalidate cache in front of a backing store.
pub struct CacheAside<V> {
    store: Option<Arc<dyn CacheStore<V>>>,
    collections: Arc<CollectionRegistry>,
    policy: TtlPolicy,
}

impl<V> Clone for CacheAside<V> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            collections: Arc::clone(&self.collections),
            policy: self.policy,
        }
    }
}

impl<V> CacheAside<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn CacheStore<V>>) -> Self {
        Self {
            store: Some(store),
            collections: Arc::new(CollectionRegistry::new()),
            policy: TtlPolicy::default(),
        }
    }

    /// Pass-through mode: every read calls the loader, writes are no-ops.
    pub fn disabled() -> Self {
        Self {
            store: None,
            collections: Arc::new(CollectionRegistry::new()),
            policy: TtlPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TtlPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TtlPolicy {
        self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    /// Number of collection keys currently tracked for `kind`.
    pub fn tracked_collections(&self, kind: ResourceKind) -> usize {
        self.collections.len(kind)
    }

    /// Return the live entry under `key`, or run `loader` and cache its value.
    ///
    /// `Ok(None)` from the loader is reported as [`Fetched::NotFound`] and is
    /// not cached. Loader errors are returned unchanged and nothing is cached.
    pub async fn fetch_or_load<F, Fut, E>(
        &self,
        key: &CacheKey,
        ttl: Ttl,
        loader: F,
    ) -> Result<Fetched<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        let kind = key.kind().as_str();

        let Some(store) = &self.store else {
            return Ok(loader().await?.map_or(Fetched::NotFound, Fetched::Loaded));
        };

        match store.get(key).await {
            Ok(Some(value)) => {
                counter!("hotelier_cache_hit_total", "kind" => kind).increment(1);
                debug!(key = %key, "cache hit");
                return Ok(Fetched::Cached(value));
            }
            Ok(None) => {
                counter!("hotelier_cache_miss_total", "kind" => kind).increment(1);
                debug!(key = %key, "cache miss");
            }
            Err(err) => report_store_error("get", key, &err),
        }

        let Some(value) = loader().await? else {
            counter!("hotelier_cache_not_found_total", "kind" => kind).increment(1);
            debug!(key = %key, "backing store returned nothing; not caching");
            return Ok(Fetched::NotFound);
        };

        self.write(&**store, key.clone(), value.clone(), ttl).await;
        Ok(Fetched::Loaded(value))
    }

    /// [`fetch_or_load`](Self::fetch_or_load) with the entity TTL.
    pub async fn fetch_record<F, Fut, E>(&self, key: &CacheKey, loader: F) -> Result<Fetched<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        self.fetch_or_load(key, self.policy.entity, loader).await
    }

    /// [`fetch_or_load`](Self::fetch_or_load) with the collection TTL.
    pub async fn fetch_collection<F, Fut, E>(
        &self,
        key: &CacheKey,
        loader: F,
    ) -> Result<Fetched<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        self.fetch_or_load(key, self.policy.collection, loader).await
    }

    /// Unconditionally write `value` under `key`.
    pub async fn put(&self, key: CacheKey, value: V, ttl: Ttl) {
        if let Some(store) = &self.store {
            self.write(&**store, key, value, ttl).await;
        }
    }

    /// Write a single record with the entity TTL.
    pub async fn put_record(&self, key: CacheKey, value: V) {
        self.put(key, value, self.policy.entity).await;
    }

    /// Remove a single entry.
    pub async fn invalidate(&self, key: &CacheKey) {
        let Some(store) = &self.store else {
            return;
        };
        self.collections.forget(key);
        counter!("hotelier_cache_invalidate_total", "kind" => key.kind().as_str()).increment(1);
        if let Err(err) = store.remove(key).await {
            report_store_error("remove", key, &err);
        }
    }

    /// Remove every collection entry written for `kind`.
    ///
    /// Entries written by other processes or evicted from the registry's view
    /// are still bounded by the collection TTL.
    pub async fn invalidate_collections(&self, kind: ResourceKind) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        let keys = self.collections.drain(kind);
        for key in &keys {
            if let Err(err) = store.remove(key).await {
                report_store_error("remove", key, &err);
            }
        }

        counter!("hotelier_cache_invalidate_total", "kind" => kind.as_str())
            .increment(keys.len() as u64);
        debug!(kind = %kind, removed = keys.len(), "invalidated collection entries");
        keys.len()
    }

    /// Drop expired entries from the store and forget their collection keys.
    pub async fn purge_expired(&self) -> usize {
        let Some(store) = &self.store else {
            return 0;
        };

        match store.purge_expired().await {
            Ok(purged) => {
                self.forget_all(&purged);
                purged.len()
            }
            Err(err) => {
                counter!("hotelier_cache_store_error_total", "op" => "purge").increment(1);
                warn!(error = %err, "cache purge failed");
                0
            }
        }
    }

    /// Run [`purge_expired`](Self::purge_expired) every `every` until the
    /// handle is aborted. Returns `None` in pass-through mode.
    pub fn spawn_sweeper(&self, every: Duration) -> Option<JoinHandle<()>> {
        self.store.as_ref()?;
        let cache = self.clone();
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.tick().await; // Skip the first immediate tick
            loop {
                interval.tick().await;
                let purged = cache.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "swept expired cache entries");
                }
            }
        }))
    }

    async fn write(&self, store: &dyn CacheStore<V>, key: CacheKey, value: V, ttl: Ttl) {
        // Register first so an invalidation racing this write still sees the key.
        self.collections.register(&key);
        match store.set(key.clone(), value, ttl).await {
            Ok(evicted) => self.forget_all(&evicted),
            Err(err) => {
                self.collections.forget(&key);
                counter!("hotelier_cache_store_error_total", "op" => "set").increment(1);
                warn!(
                    key = %key,
                    error = %err,
                    "cache write failed; continuing without cached value"
                );
            }
        }
    }

    fn forget_all(&self, keys: &[CacheKey]) {
        for key in keys {
            self.collections.forget(key);
        }
    }
}

fn report_store_error(op: &'static str, key: &CacheKey, err: &CacheStoreError) {
    counter!("hotelier_cache_store_error_total", "op" => op).increment(1);
    warn!(
        op,
        key = %key,
        error = %err,
        "cache store failed; falling through"
    );
}
