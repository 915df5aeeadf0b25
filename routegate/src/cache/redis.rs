//! Durable cache tier backed by Redis.
//!
//! The connection is established lazily on first use. A failed attempt leaves
//! nothing behind, so the next call simply tries again; that is how the
//! gateway picks the store back up once it becomes reachable.

use std::future::Future;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::traits::{BoxFuture, CacheStore, StoreError};

/// Default bound on every store round trip.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Redis-backed [`CacheStore`].
pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    timeout: Duration,
}

impl RedisStore {
    /// Create a store for `url` (e.g. `redis://localhost:6379`).
    ///
    /// Only the URL is validated here; no connection is made until the first
    /// operation.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            timeout,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                let conn = self
                    .client
                    .get_connection_manager()
                    .await
                    .map_err(map_redis_error)?;
                info!("Connected to Redis cache store");
                Ok::<_, StoreError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }

    /// Runs one store operation under the store deadline, connecting first if needed.
    async fn bounded<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = Result<T, RedisError>>,
    {
        let work = async {
            let conn = self.connection().await?;
            op(conn).await.map_err(map_redis_error)
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }
}

fn map_redis_error(e: RedisError) -> StoreError {
    if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Command(e.to_string())
    }
}

/// SETEX rejects a zero lifetime, so sub-second TTLs round up to one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

impl CacheStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
        let key = key.to_string();
        Box::pin(async move {
            let value: Option<Vec<u8>> = self
                .bounded(|mut conn| async move { conn.get(&key).await })
                .await?;
            debug!(hit = value.is_some(), "Redis lookup");
            Ok(value)
        })
    }

    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let key = key.to_string();
        let seconds = ttl_seconds(ttl);
        Box::pin(async move {
            self.bounded(|mut conn| async move { conn.set_ex::<_, _, ()>(&key, value, seconds).await })
                .await
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            self.bounded(|mut conn| async move {
                let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
                Ok(())
            })
            .await
        })
    }

    fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
        Box::pin(async move {
            self.bounded(|mut conn| async move {
                let count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
                Ok(count)
            })
            .await
        })
    }
}
