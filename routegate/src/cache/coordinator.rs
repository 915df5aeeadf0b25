//! Two-tier cache coordinator.
//!
//! The coordinator puts the durable store and the local fallback behind one
//! get/set contract:
//!
//! - `get` asks the store; if the store *fails* (as opposed to reporting a
//!   miss) the same call is answered from the local tier instead.
//! - `set` writes to the store; if that fails the value goes to the local
//!   tier. A value is never written to both.
//!
//! No "store is down" state is kept between calls. Every call tries the
//! store first, so the gateway returns to the durable tier on its own as soon
//! as the store answers again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::local::LocalCache;
use super::traits::CacheStore;
use crate::telemetry::GatewayMetrics;

/// Which tier is currently answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Durable,
    Local,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Durable => write!(f, "durable"),
            CacheBackend::Local => write!(f, "local"),
        }
    }
}

/// Cache statistics reported by [`CacheCoordinator::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub backend: CacheBackend,
    pub approximate_entry_count: u64,
    pub hits: u64,
    pub misses: u64,
    /// Calls answered by the local tier because the store failed
    pub degraded_operations: u64,
}

/// Unifies the durable store and local cache behind one contract.
pub struct CacheCoordinator {
    store: Option<Arc<dyn CacheStore>>,
    local: LocalCache,
    metrics: Arc<GatewayMetrics>,
}

impl CacheCoordinator {
    /// Create a coordinator.
    ///
    /// With `store` set to `None` the coordinator runs on the local tier alone.
    pub fn new(
        store: Option<Arc<dyn CacheStore>>,
        local: LocalCache,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            store,
            local,
            metrics,
        }
    }

    /// Look up a value. Never fails; store errors degrade to the local tier.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let value = match &self.store {
            Some(store) => match store.get(key).await {
                Ok(value) => value,
                Err(e) => {
                    warn!(
                        key = %key,
                        store = store.name(),
                        error = %e,
                        "Cache store get failed, using local cache"
                    );
                    self.metrics.cache_degraded();
                    self.local.get(key).await
                }
            },
            None => self.local.get(key).await,
        };

        if value.is_some() {
            debug!(key = %key, "Cache hit");
            self.metrics.cache_hit();
        } else {
            debug!(key = %key, "Cache miss");
            self.metrics.cache_miss();
        }
        value
    }

    /// Store a value. Never fails; store errors degrade to the local tier.
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let Some(store) = &self.store else {
            self.local.set(key, value, ttl).await;
            return;
        };

        // The store takes ownership, so keep a copy for the fallback path
        match store.set(key, value.clone(), ttl).await {
            Ok(()) => debug!(key = %key, ttl_secs = ttl.as_secs(), "Cached in store"),
            Err(e) => {
                warn!(
                    key = %key,
                    store = store.name(),
                    error = %e,
                    "Cache store set failed, using local cache"
                );
                self.metrics.cache_degraded();
                self.local.set(key, value, ttl).await;
            }
        }
    }

    /// Remove every entry from both tiers.
    ///
    /// A store that cannot be cleared is logged; the local tier is cleared regardless.
    pub async fn clear(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.clear().await {
                warn!(store = store.name(), error = %e, "Failed to clear cache store");
            }
        }
        self.local.clear().await;
    }

    /// Current backend and entry counts.
    ///
    /// The backend is `Durable` when a store is configured and answers.
    pub async fn stats(&self) -> CacheStats {
        let (backend, approximate_entry_count) = match &self.store {
            Some(store) => match store.entry_count().await {
                Ok(count) => (CacheBackend::Durable, count),
                Err(e) => {
                    warn!(store = store.name(), error = %e, "Cache store unavailable for stats");
                    (CacheBackend::Local, self.local.entry_count().await)
                }
            },
            None => (CacheBackend::Local, self.local.entry_count().await),
        };

        CacheStats {
            backend,
            approximate_entry_count,
            hits: self.metrics.cache_hits(),
            misses: self.metrics.cache_misses(),
            degraded_operations: self.metrics.cache_degraded_count(),
        }
    }

    /// Whether a durable store is configured at all.
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::traits::{BoxFuture, StoreError};
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory store that can be switched off.
    #[derive(Default)]
    struct SwitchableStore {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        down: AtomicBool,
        calls: AtomicUsize,
    }

    impl SwitchableStore {
        fn set_down(&self, down: bool) {
            self.down.store(down, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                Err(StoreError::Unavailable("connection refused".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl CacheStore for SwitchableStore {
        fn name(&self) -> &'static str {
            "switchable"
        }

        fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
            let key = key.to_string();
            Box::pin(async move {
                self.check()?;
                Ok(self.entries.lock().get(&key).cloned())
            })
        }

        fn set(
            &self,
            key: &str,
            value: Vec<u8>,
            _ttl: Duration,
        ) -> BoxFuture<'_, Result<(), StoreError>> {
            let key = key.to_string();
            Box::pin(async move {
                self.check()?;
                self.entries.lock().insert(key, value);
                Ok(())
            })
        }

        fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
            Box::pin(async move {
                self.check()?;
                self.entries.lock().clear();
                Ok(())
            })
        }

        fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
            Box::pin(async move {
                self.check()?;
                Ok(self.entries.lock().len() as u64)
            })
        }
    }

    fn coordinator(store: Option<Arc<SwitchableStore>>) -> (CacheCoordinator, LocalCache) {
        let local = LocalCache::new(100);
        let store = store.map(|s| s as Arc<dyn CacheStore>);
        let coordinator =
            CacheCoordinator::new(store, local.clone(), Arc::new(GatewayMetrics::new()));
        (coordinator, local)
    }

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_round_trip_with_healthy_store() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, local) = coordinator(Some(store.clone()));

        coordinator.set("k", vec![1, 2], TTL).await;

        assert_eq!(coordinator.get("k").await, Some(vec![1, 2]));
        assert!(store.entries.lock().contains_key("k"));
        // Healthy store is authoritative; nothing is written locally
        assert!(local.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_round_trip_with_store_down() {
        let store = Arc::new(SwitchableStore::default());
        store.set_down(true);
        let (coordinator, local) = coordinator(Some(store.clone()));

        coordinator.set("k", vec![3], TTL).await;

        assert_eq!(coordinator.get("k").await, Some(vec![3]));
        assert_eq!(local.get("k").await, Some(vec![3]));
        assert!(store.entries.lock().is_empty());
    }

    #[tokio::test]
    async fn test_local_only_mode() {
        let (coordinator, _local) = coordinator(None);

        coordinator.set("k", vec![4], TTL).await;

        assert_eq!(coordinator.get("k").await, Some(vec![4]));
        let stats = coordinator.stats().await;
        assert_eq!(stats.backend, CacheBackend::Local);
        assert_eq!(stats.approximate_entry_count, 1);
        assert_eq!(stats.degraded_operations, 0);
    }

    #[tokio::test]
    async fn test_recovers_when_store_returns() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, _local) = coordinator(Some(store.clone()));

        store.set_down(true);
        coordinator.set("during", vec![1], TTL).await;
        assert_eq!(coordinator.stats().await.backend, CacheBackend::Local);

        store.set_down(false);
        coordinator.set("after", vec![2], TTL).await;

        assert!(store.entries.lock().contains_key("after"));
        assert_eq!(coordinator.get("after").await, Some(vec![2]));
        assert_eq!(coordinator.stats().await.backend, CacheBackend::Durable);
    }

    #[tokio::test]
    async fn test_each_call_tries_store_once() {
        let store = Arc::new(SwitchableStore::default());
        store.set_down(true);
        let (coordinator, _local) = coordinator(Some(store.clone()));

        coordinator.get("a").await;
        coordinator.set("a", vec![1], TTL).await;
        coordinator.get("a").await;

        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_store_miss_does_not_read_local() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, local) = coordinator(Some(store.clone()));

        local.set("k", vec![9], TTL).await;

        assert!(coordinator.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_clears_both_tiers() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, local) = coordinator(Some(store.clone()));

        coordinator.set("durable", vec![1], TTL).await;
        local.set("local", vec![2], TTL).await;

        coordinator.clear().await;

        assert!(store.entries.lock().is_empty());
        assert!(local.get("local").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_survives_store_failure() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, local) = coordinator(Some(store.clone()));
        local.set("local", vec![2], TTL).await;
        store.set_down(true);

        coordinator.clear().await;

        assert!(local.get("local").await.is_none());
    }

    #[tokio::test]
    async fn test_stats_count_hits_and_degraded() {
        let store = Arc::new(SwitchableStore::default());
        let (coordinator, _local) = coordinator(Some(store.clone()));

        coordinator.set("k", vec![1], TTL).await;
        coordinator.get("k").await;
        coordinator.get("missing").await;
        store.set_down(true);
        coordinator.get("k").await;
        store.set_down(false);

        let stats = coordinator.stats().await;
        assert_eq!(stats.backend, CacheBackend::Durable);
        assert_eq!(stats.approximate_entry_count, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.degraded_operations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_entries_expire() {
        let store = Arc::new(SwitchableStore::default());
        store.set_down(true);
        let (coordinator, _local) = coordinator(Some(store.clone()));

        coordinator.set("k", vec![1], Duration::from_secs(60)).await;
        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(coordinator.get("k").await.is_none());
    }

    #[test]
    fn test_backend_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&CacheBackend::Durable).unwrap(),
            "\"durable\""
        );
        assert_eq!(CacheBackend::Local.to_string(), "local");
    }
}
