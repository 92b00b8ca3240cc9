use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serial_test::serial;

use hotelier::cache::{
    CacheAside, CacheConfig, CacheKey, CacheStore, CacheStoreError, MemoryStore, ResourceKind, Ttl,
};

const ROOM: ResourceKind = ResourceKind::new("room");

struct BrokenStore;

#[async_trait]
impl CacheStore<String> for BrokenStore {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheStoreError> {
        Err(CacheStoreError::Unavailable("offline".into()))
    }

    async fn set(
        &self,
        _key: CacheKey,
        _value: String,
        _ttl: Ttl,
    ) -> Result<Vec<CacheKey>, CacheStoreError> {
        Err(CacheStoreError::Unavailable("offline".into()))
    }

    async fn remove(&self, _key: &CacheKey) -> Result<(), CacheStoreError> {
        Err(CacheStoreError::Unavailable("offline".into()))
    }
}

async fn load(value: &str) -> Result<Option<String>, Infallible> {
    Ok(Some(value.to_string()))
}

#[tokio::test(start_paused = true)]
#[serial]
async fn cache_paths_emit_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let store = Arc::new(MemoryStore::<String>::new(&CacheConfig {
        capacity: 1,
        ..Default::default()
    }));
    let cache = CacheAside::<String>::new(store);
    let first = CacheKey::entity(ROOM, 1);
    let second = CacheKey::entity(ROOM, 2);

    // miss, then hit
    cache
        .fetch_or_load(&first, Ttl::seconds(5), || load("101"))
        .await
        .expect("loader is infallible");
    cache
        .fetch_or_load(&first, Ttl::seconds(5), || load("101"))
        .await
        .expect("loader is infallible");

    // not found is reported and not cached
    cache
        .fetch_or_load(&second, Ttl::seconds(5), || async {
            Ok::<_, Infallible>(None)
        })
        .await
        .expect("loader is infallible");

    // capacity 1: writing the second key evicts the first
    cache.put(second.clone(), "102".into(), Ttl::seconds(5)).await;

    // lazy expiry on read
    tokio::time::advance(Duration::from_secs(6)).await;
    cache
        .fetch_or_load(&second, Ttl::seconds(5), || load("102"))
        .await
        .expect("loader is infallible");

    cache.invalidate(&second).await;

    let broken = CacheAside::<String>::new(Arc::new(BrokenStore));
    let fetched = broken
        .fetch_or_load(&first, Ttl::seconds(5), || load("101"))
        .await
        .expect("loader is infallible");
    assert_eq!(fetched.into_option().as_deref(), Some("101"));

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => {
                Some((composite_key.key().name().to_string(), count))
            }
            _ => None,
        })
        .fold(HashMap::new(), |mut acc, (name, count)| {
            *acc.entry(name).or_default() += count;
            acc
        });

    let expected = [
        ("hotelier_cache_hit_total", 1),
        ("hotelier_cache_miss_total", 3),
        ("hotelier_cache_not_found_total", 1),
        ("hotelier_cache_evict_total", 1),
        ("hotelier_cache_expired_total", 1),
        ("hotelier_cache_invalidate_total", 1),
        ("hotelier_cache_store_error_total", 2),
    ];

    for (metric, count) in expected {
        assert_eq!(
            counters.get(metric).copied(),
            Some(count),
            "unexpected value for {metric}"
        );
    }
}
