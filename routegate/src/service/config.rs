//! Runtime configuration for the gateway.

use std::time::Duration;

use crate::cache::{DEFAULT_LOCAL_MAX_ENTRIES, DEFAULT_STORE_TIMEOUT};
use crate::config::ConfigFile;
use crate::engine::DEFAULT_ENGINE_TIMEOUT;
use crate::fanout::FanOutConfig;
use crate::query::Profile;

use super::ttl::TtlPolicy;

/// Everything [`Gateway`](super::Gateway) needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Routing engine base URL
    pub engine_url: String,
    /// Bound on each direct engine call
    pub engine_timeout: Duration,
    /// Profile used when a caller does not name one
    pub default_profile: Profile,
    /// Durable store URL, `None` for local-only operation
    pub redis_url: Option<String>,
    pub store_timeout: Duration,
    pub local_max_entries: u64,
    /// Share one engine call between identical concurrent cache misses
    pub coalesce: bool,
    pub ttl: TtlPolicy,
    pub fanout: FanOutConfig,
}

impl GatewayConfig {
    /// Translate a loaded configuration file.
    ///
    /// Fan-out sub-queries use the engine timeout as their per-point timeout.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        let engine_timeout = Duration::from_secs(file.engine.timeout);
        let secs = Duration::from_secs;

        Self {
            engine_url: file.engine.url.clone(),
            engine_timeout,
            default_profile: file.engine.profile,
            redis_url: file.cache.redis_url.clone(),
            store_timeout: secs(file.cache.store_timeout),
            local_max_entries: file.cache.local_max_entries,
            coalesce: file.cache.coalesce,
            ttl: TtlPolicy {
                route: secs(file.ttl.route),
                table: secs(file.ttl.table),
                trip: secs(file.ttl.trip),
                matching: secs(file.ttl.matching),
                nearest: secs(file.ttl.nearest),
                reachability: secs(file.ttl.reachability),
            },
            fanout: FanOutConfig {
                max_points: file.reachability.max_points,
                max_in_flight: file.reachability.max_in_flight,
                point_timeout: engine_timeout,
                job_deadline: match file.reachability.job_deadline {
                    0 => None,
                    deadline => Some(secs(deadline)),
                },
            },
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            engine_url: crate::config::defaults::DEFAULT_ENGINE_URL.to_string(),
            engine_timeout: DEFAULT_ENGINE_TIMEOUT,
            default_profile: Profile::default(),
            redis_url: None,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            local_max_entries: DEFAULT_LOCAL_MAX_ENTRIES,
            coalesce: true,
            ttl: TtlPolicy::default(),
            fanout: FanOutConfig::default(),
        }
    }
}
