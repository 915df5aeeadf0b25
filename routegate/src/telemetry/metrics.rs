//! Lock-free atomic metrics collection.

use super::TelemetrySnapshot;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

/// Lock-free metrics collection for the gateway.
///
/// All operations use `Relaxed` ordering. Counters are independent
/// measurements, so no ordering between them is needed.
pub struct GatewayMetrics {
    start_time: Instant,

    // === Query metrics ===
    queries_completed: AtomicU64,
    queries_failed: AtomicU64,
    queries_coalesced: AtomicU64,

    // === Cache metrics ===
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    /// Calls that fell back to the local tier because the store failed
    cache_degraded: AtomicU64,

    // === Upstream metrics ===
    upstream_requests: AtomicU64,
    upstream_transport_errors: AtomicU64,
    upstream_engine_errors: AtomicU64,

    // === Fan-out metrics ===
    fanout_jobs_active: AtomicUsize,
    fanout_jobs_completed: AtomicU64,
    fanout_points_reached: AtomicU64,
    fanout_points_unavailable: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            queries_completed: AtomicU64::new(0),
            queries_failed: AtomicU64::new(0),
            queries_coalesced: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            cache_degraded: AtomicU64::new(0),
            upstream_requests: AtomicU64::new(0),
            upstream_transport_errors: AtomicU64::new(0),
            upstream_engine_errors: AtomicU64::new(0),
            fanout_jobs_active: AtomicUsize::new(0),
            fanout_jobs_completed: AtomicU64::new(0),
            fanout_points_reached: AtomicU64::new(0),
            fanout_points_unavailable: AtomicU64::new(0),
        }
    }

    // === Query tracking ===

    pub fn query_completed(&self) {
        self.queries_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn query_failed(&self) {
        self.queries_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request that waited on an identical in-flight request.
    pub fn query_coalesced(&self) {
        self.queries_coalesced.fetch_add(1, Ordering::Relaxed);
    }

    // === Cache tracking ===

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache call served by the local tier after a store failure.
    pub fn cache_degraded(&self) {
        self.cache_degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> u64 {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn cache_degraded_count(&self) -> u64 {
        self.cache_degraded.load(Ordering::Relaxed)
    }

    // === Upstream tracking ===

    pub fn upstream_request(&self) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upstream_transport_error(&self) {
        self.upstream_transport_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn upstream_engine_error(&self) {
        self.upstream_engine_errors.fetch_add(1, Ordering::Relaxed);
    }

    // === Fan-out tracking ===

    pub fn fanout_job_started(&self) {
        self.fanout_jobs_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a settled fan-out job and its per-point outcome counts.
    pub fn fanout_job_completed(&self, reached: u64, unavailable: u64) {
        self.fanout_jobs_active.fetch_sub(1, Ordering::Relaxed);
        self.fanout_jobs_completed.fetch_add(1, Ordering::Relaxed);
        self.fanout_points_reached
            .fetch_add(reached, Ordering::Relaxed);
        self.fanout_points_unavailable
            .fetch_add(unavailable, Ordering::Relaxed);
    }

    /// Create an immutable point-in-time copy of all counters.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let cache_total = cache_hits + cache_misses;

        TelemetrySnapshot {
            uptime: self.start_time.elapsed(),
            queries_completed: self.queries_completed.load(Ordering::Relaxed),
            queries_failed: self.queries_failed.load(Ordering::Relaxed),
            queries_coalesced: self.queries_coalesced.load(Ordering::Relaxed),
            cache_hits,
            cache_misses,
            cache_hit_rate: if cache_total > 0 {
                cache_hits as f64 / cache_total as f64
            } else {
                0.0
            },
            cache_degraded: self.cache_degraded.load(Ordering::Relaxed),
            upstream_requests: self.upstream_requests.load(Ordering::Relaxed),
            upstream_transport_errors: self.upstream_transport_errors.load(Ordering::Relaxed),
            upstream_engine_errors: self.upstream_engine_errors.load(Ordering::Relaxed),
            fanout_jobs_active: self.fanout_jobs_active.load(Ordering::Relaxed),
            fanout_jobs_completed: self.fanout_jobs_completed.load(Ordering::Relaxed),
            fanout_points_reached: self.fanout_points_reached.load(Ordering::Relaxed),
            fanout_points_unavailable: self.fanout_points_unavailable.load(Ordering::Relaxed),
        }
    }
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_are_zero() {
        let snapshot = GatewayMetrics::new().snapshot();
        assert_eq!(snapshot.queries_completed, 0);
        assert_eq!(snapshot.cache_hits, 0);
        assert_eq!(snapshot.cache_hit_rate, 0.0);
        assert_eq!(snapshot.fanout_jobs_active, 0);
    }

    #[test]
    fn test_cache_hit_rate() {
        let metrics = GatewayMetrics::new();
        metrics.cache_hit();
        metrics.cache_hit();
        metrics.cache_hit();
        metrics.cache_miss();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_hits, 3);
        assert_eq!(snapshot.cache_misses, 1);
        assert!((snapshot.cache_hit_rate - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_fanout_job_lifecycle() {
        let metrics = GatewayMetrics::new();
        metrics.fanout_job_started();
        assert_eq!(metrics.snapshot().fanout_jobs_active, 1);

        metrics.fanout_job_completed(20, 4);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fanout_jobs_active, 0);
        assert_eq!(snapshot.fanout_jobs_completed, 1);
        assert_eq!(snapshot.fanout_points_reached, 20);
        assert_eq!(snapshot.fanout_points_unavailable, 4);
    }

    #[test]
    fn test_upstream_errors_tracked_separately() {
        let metrics = GatewayMetrics::new();
        metrics.upstream_request();
        metrics.upstream_request();
        metrics.upstream_transport_error();
        metrics.upstream_engine_error();
        metrics.upstream_engine_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.upstream_requests, 2);
        assert_eq!(snapshot.upstream_transport_errors, 1);
        assert_eq!(snapshot.upstream_engine_errors, 2);
    }
}
