//! Process-local fallback cache using moka.
//!
//! This tier holds entries only while the durable store is unreachable. It
//! wraps `moka::future::Cache` bounded by entry count with LRU eviction, so
//! it can neither block nor fail.
//!
//! # Expiry
//!
//! Each entry carries its own TTL, enforced two ways: moka's [`Expiry`] hook
//! schedules eviction, and every entry also records its deadline on the tokio
//! clock which is checked on read. The second check is what guarantees an
//! entry is never served past its deadline, and it follows a paused test clock.

use std::time::{Duration, Instant as StdInstant};

use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;
use moka::Expiry;
use tokio::time::Instant;
use tracing::trace;

/// Default maximum number of entries held locally.
pub const DEFAULT_LOCAL_MAX_ENTRIES: u64 = 10_000;

/// Longest lifetime a local entry can have; longer TTLs are capped to it.
pub const MAX_LOCAL_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone)]
struct LocalEntry {
    value: Vec<u8>,
    ttl: Duration,
    expires_at: Instant,
}

impl LocalEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

struct LocalExpiry;

impl Expiry<String, LocalEntry> for LocalExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LocalEntry,
        _created_at: StdInstant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LocalEntry,
        _updated_at: StdInstant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache with per-entry TTL.
///
/// Cloning is cheap and every clone shares the same entries.
#[derive(Clone)]
pub struct LocalCache {
    cache: MokaCache<String, LocalEntry>,
    max_entries: u64,
}

impl LocalCache {
    /// Create a local cache holding at most `max_entries` entries.
    ///
    /// When full, the least recently used entry is evicted.
    pub fn new(max_entries: u64) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(LocalExpiry)
            .build();

        Self { cache, max_entries }
    }

    /// Look up a live entry.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entry = self.cache.get(key).await?;
        if entry.is_expired() {
            trace!(key = %key, "Local entry expired");
            self.cache.invalidate(key).await;
            return None;
        }
        Some(entry.value)
    }

    /// Insert or replace an entry that expires after `ttl`, capped at [`MAX_LOCAL_TTL`].
    pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let ttl = ttl.min(MAX_LOCAL_TTL);
        let entry = LocalEntry {
            value,
            ttl,
            expires_at: Instant::now() + ttl,
        };
        self.cache.insert(key.to_string(), entry).await;
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Number of entries after pending evictions have been applied.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub fn max_entries(&self) -> u64 {
        self.max_entries
    }
}

impl Default for LocalCache {
    fn default() -> Self {
        Self::new(DEFAULT_LOCAL_MAX_ENTRIES)
    }
}
