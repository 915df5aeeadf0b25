//! Point-in-time telemetry snapshot.

use std::fmt;
use std::time::Duration;

/// A point-in-time snapshot of gateway metrics.
#[derive(Clone, Debug)]
pub struct TelemetrySnapshot {
    /// How long the gateway has been running
    pub uptime: Duration,

    // === Query metrics ===
    /// Direct queries answered (cache or upstream)
    pub queries_completed: u64,
    /// Direct queries that returned an error
    pub queries_failed: u64,
    /// Queries that reused an identical in-flight request
    pub queries_coalesced: u64,

    // === Cache metrics ===
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Cache hit rate (0.0 - 1.0)
    pub cache_hit_rate: f64,
    /// Cache calls served by the local tier after a store failure
    pub cache_degraded: u64,

    // === Upstream metrics ===
    pub upstream_requests: u64,
    pub upstream_transport_errors: u64,
    pub upstream_engine_errors: u64,

    // === Fan-out metrics ===
    pub fanout_jobs_active: usize,
    pub fanout_jobs_completed: u64,
    pub fanout_points_reached: u64,
    pub fanout_points_unavailable: u64,
}

impl fmt::Display for TelemetrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "queries: {} ok / {} failed / {} coalesced, cache: {:.1}% hit ({} degraded), \
             upstream: {} requests ({} transport errors, {} engine errors), \
             fan-out: {} jobs, {} points reached, {} unavailable",
            self.queries_completed,
            self.queries_failed,
            self.queries_coalesced,
            self.cache_hit_rate * 100.0,
            self.cache_degraded,
            self.upstream_requests,
            self.upstream_transport_errors,
            self.upstream_engine_errors,
            self.fanout_jobs_completed,
            self.fanout_points_reached,
            self.fanout_points_unavailable,
        )
    }
}
