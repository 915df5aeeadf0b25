//! The gateway facade.
//!
//! `Gateway` owns one routing client, one cache coordinator and one fan-out
//! aggregator, all constructed once at startup and shared by every request.
//!
//! # Request flow
//!
//! ```text
//! cached_query(q) ──► derive_key ──► CacheCoordinator::get ──hit──► response
//!                                          │ miss
//!                                          ▼
//!                               RequestCoalescer (optional)
//!                                          │ leader only
//!                                          ▼
//!                               RoutingClient::call ──► CacheCoordinator::set
//! ```
//!
//! `fan_out_reachability` follows the same path with the fan-out aggregator
//! in place of the single engine call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cache::{
    derive_key, derive_reachability_key, CacheCoordinator, CacheKey, CacheStats, CacheStore,
    LocalCache, RedisStore,
};
use crate::coalesce::RequestCoalescer;
use crate::engine::{AsyncHttpClient, AsyncReqwestClient, RoutingClient};
use crate::error::GatewayError;
use crate::fanout::{FanOutAggregator, Reachability, ReachabilityRequest};
use crate::query::{Profile, Query};
use crate::telemetry::{GatewayMetrics, TelemetrySnapshot};

use super::config::GatewayConfig;
use super::summary::{summarize, QuerySummary};

/// Response to a direct query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    /// The engine's JSON response, unchanged
    pub body: Value,
    /// `true` when served from a cache tier
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<QuerySummary>,
}

/// Caching gateway in front of a routing engine.
pub struct Gateway<C = AsyncReqwestClient> {
    config: GatewayConfig,
    client: Arc<RoutingClient<C>>,
    cache: CacheCoordinator,
    aggregator: FanOutAggregator<C>,
    queries: RequestCoalescer<Result<Value, GatewayError>>,
    reachability_jobs: RequestCoalescer<Result<Reachability, GatewayError>>,
    metrics: Arc<GatewayMetrics>,
}

impl Gateway<AsyncReqwestClient> {
    /// Build a gateway talking to the configured engine over HTTP.
    ///
    /// The durable store is only configured here; it is connected on first
    /// use, so an unreachable store does not prevent startup.
    pub fn start(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = AsyncReqwestClient::new().map_err(|e| GatewayError::Startup(e.to_string()))?;

        let store: Option<Arc<dyn CacheStore>> = match &config.redis_url {
            Some(url) => {
                let store = RedisStore::new(url, config.store_timeout)
                    .map_err(|e| GatewayError::Startup(e.to_string()))?;
                info!(url = %url, "Durable cache store configured");
                Some(Arc::new(store))
            }
            None => {
                info!("No durable cache store configured, using local cache only");
                None
            }
        };

        Ok(Self::new(config, http, store))
    }
}

impl<C> Gateway<C>
where
    C: AsyncHttpClient + 'static,
{
    /// Assemble a gateway from pre-built parts.
    pub fn new(config: GatewayConfig, http: C, store: Option<Arc<dyn CacheStore>>) -> Self {
        let metrics = Arc::new(GatewayMetrics::new());
        let client = Arc::new(RoutingClient::new(
            http,
            config.engine_url.clone(),
            Arc::clone(&metrics),
        ));
        let cache = CacheCoordinator::new(
            store,
            LocalCache::new(config.local_max_entries),
            Arc::clone(&metrics),
        );
        let aggregator = FanOutAggregator::new(
            Arc::clone(&client),
            config.fanout.clone(),
            Arc::clone(&metrics),
        );

        info!(
            engine = %config.engine_url,
            durable_store = cache.has_store(),
            coalesce = config.coalesce,
            "Gateway ready"
        );

        Self {
            config,
            client,
            cache,
            aggregator,
            queries: RequestCoalescer::new(),
            reachability_jobs: RequestCoalescer::new(),
            metrics,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn default_profile(&self) -> Profile {
        self.config.default_profile
    }

    /// Answer a direct query, from cache when possible.
    ///
    /// Transport and engine failures are returned to the caller and never
    /// cached.
    #[instrument(skip_all, fields(kind = %query.kind()))]
    pub async fn cached_query(&self, query: &Query) -> Result<QueryResponse, GatewayError> {
        let key = derive_key(query);
        let ttl = self.config.ttl.for_kind(query.kind());
        let timeout = self.config.engine_timeout;
        let client = &self.client;

        let result = self
            .resolve(&key, ttl, &self.queries, |_| true, || async move {
                client.call(query, timeout).await.map_err(GatewayError::from)
            })
            .await;

        match result {
            Ok((body, cached)) => {
                self.metrics.query_completed();
                let summary = summarize(query, &body);
                Ok(QueryResponse {
                    body,
                    cached,
                    summary,
                })
            }
            Err(e) => {
                self.metrics.query_failed();
                warn!(key = %key, error = %e, "Query failed");
                Err(e)
            }
        }
    }

    /// Compute reachability buckets around an origin, from cache when possible.
    ///
    /// A result in which nothing but the origin was available is returned
    /// but not cached.
    #[instrument(skip_all, fields(origin = %request.origin()))]
    pub async fn fan_out_reachability(
        &self,
        request: ReachabilityRequest,
    ) -> Result<Reachability, GatewayError> {
        let key = derive_reachability_key(&request);
        let ttl = self.config.ttl.reachability;
        let aggregator = &self.aggregator;
        let request = &request;

        let (reachability, cached) = self
            .resolve(
                &key,
                ttl,
                &self.reachability_jobs,
                |r: &Reachability| r.available_points > 1,
                || async move { aggregator.run(request).await.map_err(GatewayError::from) },
            )
            .await?;

        debug!(cached, available = reachability.available_points, "Reachability resolved");
        Ok(reachability)
    }

    /// Backend in use and approximate entry count.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Empty both cache tiers.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
        info!("Cache cleared");
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }

    /// Log final statistics and release the gateway.
    pub fn shutdown(self) -> TelemetrySnapshot {
        let snapshot = self.metrics.snapshot();
        let queries = self.queries.stats();
        info!(
            uptime_secs = snapshot.uptime.as_secs(),
            coalescing_ratio = queries.coalescing_ratio(),
            "Gateway shutting down: {}",
            snapshot
        );
        snapshot
    }

    /// Cache lookup, then coalesced computation and cache write on a miss.
    ///
    /// Only the caller that runs `compute` writes the result back. Returns the
    /// value and whether it came from cache.
    async fn resolve<T, P, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        coalescer: &RequestCoalescer<Result<T, GatewayError>>,
        cacheable: P,
        compute: F,
    ) -> Result<(T, bool), GatewayError>
    where
        T: Serialize + DeserializeOwned + Clone + Send + 'static,
        P: Fn(&T) -> bool,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        if let Some(value) = self.read_cached(key).await {
            return Ok((value, true));
        }

        let work = move || async move {
            let value = compute().await?;
            if cacheable(&value) {
                self.write_cached(key, &value, ttl).await;
            } else {
                debug!(key = %key, "Result not cacheable");
            }
            Ok::<_, GatewayError>(value)
        };

        let result = if self.config.coalesce {
            let coalesced = coalescer.run(key.as_str(), work).await;
            if coalesced.shared {
                self.metrics.query_coalesced();
            }
            coalesced.value
        } else {
            work().await
        };

        result.map(|value| (value, false))
    }

    async fn read_cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let bytes = self.cache.get(key.as_str()).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                // Treated as a miss; the fresh result overwrites it
                warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    async fn write_cached<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.cache.set(key.as_str(), bytes, ttl).await,
            Err(e) => warn!(key = %key, error = %e, "Failed to serialize result for cache"),
        }
    }
}
