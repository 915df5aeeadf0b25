//! Gateway telemetry for observability.
//!
//! Lock-free atomic counters shared by the cache coordinator, the routing
//! client and the fan-out aggregator, plus an immutable snapshot for display.
//!
//! # Architecture
//!
//! ```text
//! Coordinator / Client / Aggregator ─────► GatewayMetrics ─────► TelemetrySnapshot
//!                                          (atomic counters)     (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use routegate::telemetry::GatewayMetrics;
//! use std::sync::Arc;
//!
//! let metrics = Arc::new(GatewayMetrics::new());
//! metrics.cache_hit();
//! metrics.query_completed();
//!
//! let snapshot = metrics.snapshot();
//! println!("Cache hit rate: {:.1}%", snapshot.cache_hit_rate * 100.0);
//! ```

mod metrics;
mod snapshot;

pub use metrics::GatewayMetrics;
pub use snapshot::TelemetrySnapshot;
