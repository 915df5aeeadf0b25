//! Default configuration values.

use std::path::PathBuf;

pub use crate::cache::DEFAULT_LOCAL_MAX_ENTRIES;
pub use crate::fanout::DEFAULT_MAX_POINTS;

/// Routing engine base URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:5000";

/// Per-request routing engine timeout in seconds.
pub const DEFAULT_ENGINE_TIMEOUT_SECS: u64 = 30;

/// Durable cache store URL.
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Bound on each cache store round trip in seconds.
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 2;

/// Reachability grid step in degrees.
pub const DEFAULT_GRID_STEP: f64 = 0.01;

/// Reachability grid radius in degrees.
pub const DEFAULT_GRID_RADIUS: f64 = 0.1;

/// Reachability time limits in seconds.
pub const DEFAULT_TIME_LIMITS: [u64; 3] = [300, 600, 900];

/// Log file name.
pub const DEFAULT_LOG_FILE: &str = "routegate.log";

/// Environment variable overriding `engine.url`.
pub const ENV_ENGINE_URL: &str = "OSRM_BACKEND_URL";

/// Environment variable overriding `cache.redis_url`. Empty disables the store.
pub const ENV_REDIS_URL: &str = "REDIS_URL";

/// Default log directory (~/.routegate/logs).
pub fn default_log_directory() -> PathBuf {
    super::file::config_directory().join("logs")
}
