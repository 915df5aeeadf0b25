//! Gateway service layer.
//!
//! [`Gateway`] is the single entry point for callers. It is constructed once
//! with every dependency it needs (routing client, cache tiers, fan-out
//! aggregator) and exposes the downstream operations:
//!
//! - [`Gateway::cached_query`] for route, table, trip, match and nearest queries
//! - [`Gateway::fan_out_reachability`] for grid reachability
//! - [`Gateway::cache_stats`] and [`Gateway::clear_cache`]

mod config;
mod gateway;
mod summary;
mod ttl;

pub use config::GatewayConfig;
pub use gateway::{Gateway, QueryResponse};
pub use summary::{summarize, QuerySummary};
pub use ttl::TtlPolicy;
