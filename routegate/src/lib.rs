//! routegate - caching gateway in front of an OSRM-compatible routing engine
//!
//! The library answers route, table, trip, match and nearest queries through
//! a two-tier cache (a shared Redis store with a process-local fallback) and
//! computes reachability over a coordinate grid by fanning out many
//! single-route requests concurrently.
//!
//! # Overview
//!
//! ```text
//!             ┌──────────────────────────────────────────┐
//!             │                 Gateway                  │
//!             │  cached_query       fan_out_reachability │
//!             └──────┬──────────────────────┬────────────┘
//!                    │                      │
//!        ┌───────────▼──────────┐   ┌───────▼────────────┐
//!        │   CacheCoordinator   │   │  FanOutAggregator  │
//!        │  Redis ──► LocalCache│   │  grid ► JoinSet ►  │
//!        └──────────────────────┘   │  reduce            │
//!                                   └───────┬────────────┘
//!                                           │
//!                               ┌───────────▼───────────┐
//!                               │     RoutingClient     │
//!                               └───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use routegate::config::ConfigFile;
//! use routegate::query::{Query, RouteOptions};
//! use routegate::service::{Gateway, GatewayConfig};
//!
//! let file = ConfigFile::load()?.apply_env_overrides();
//! let gateway = Gateway::start(GatewayConfig::from_config_file(&file))?;
//! let response = gateway.cached_query(&query).await?;
//! ```

pub mod cache;
pub mod coalesce;
pub mod config;
pub mod coord;
pub mod engine;
pub mod error;
pub mod fanout;
pub mod logging;
pub mod query;
pub mod service;
pub mod telemetry;

pub use coord::Coordinate;
pub use error::GatewayError;
pub use service::{Gateway, GatewayConfig};
