//! INI serialization logic for converting `ConfigFile` → INI string.

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let redis_url = config.cache.redis_url.as_deref().unwrap_or("");
    let time_limits = config
        .reachability
        .time_limits
        .iter()
        .map(|limit| limit.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[engine]
; Base URL of the routing engine
url = {}
; Default travel profile: driving, walking, cycling
profile = {}
; Per-request timeout in seconds
timeout = {}

[cache]
; Durable cache store. Leave empty to use the local cache only.
redis_url = {}
; Entries kept by the local fallback cache
local_max_entries = {}
; Bound on each cache store round trip in seconds
store_timeout = {}
; Share one upstream call between identical concurrent requests
coalesce = {}

[ttl]
; Cache lifetimes in seconds
route = {}
table = {}
trip = {}
match = {}
nearest = {}
reachability = {}

[reachability]
; Grid spacing and half-width in degrees
step = {}
radius = {}
; Comma-separated travel-time limits in seconds
time_limits = {}
; Largest grid a single request may cover
max_points = {}
; Concurrent engine calls per request (0 = unbounded)
max_in_flight = {}
; Overall deadline in seconds (0 = none)
job_deadline = {}

[logging]
directory = {}
file = {}
"#,
        config.engine.url,
        config.engine.profile,
        config.engine.timeout,
        redis_url,
        config.cache.local_max_entries,
        config.cache.store_timeout,
        config.cache.coalesce,
        config.ttl.route,
        config.ttl.table,
        config.ttl.trip,
        config.ttl.matching,
        config.ttl.nearest,
        config.ttl.reachability,
        config.reachability.step,
        config.reachability.radius,
        time_limits,
        config.reachability.max_points,
        config.reachability.max_in_flight,
        config.reachability.job_deadline,
        config.logging.directory.display(),
        config.logging.file,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_every_section() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[engine]", "[cache]", "[ttl]", "[reachability]", "[logging]"] {
            assert!(content.contains(section), "missing {section}");
        }
        assert!(content.contains("time_limits = 300, 600, 900"));
    }
}
