//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::query::Profile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [engine] section
    if let Some(section) = ini.section(Some("engine")) {
        if let Some(v) = section.get("url") {
            let v = v.trim();
            if !(v.starts_with("http://") || v.starts_with("https://")) {
                return Err(invalid("engine", "url", v, "must start with http:// or https://"));
            }
            config.engine.url = v.to_string();
        }
        if let Some(v) = section.get("profile") {
            config.engine.profile = v.parse::<Profile>().map_err(|_| {
                invalid("engine", "profile", v, "must be one of: driving, walking, cycling")
            })?;
        }
        if let Some(v) = section.get("timeout") {
            config.engine.timeout = parse_positive("engine", "timeout", v)?;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("redis_url") {
            let v = v.trim();
            config.cache.redis_url = (!v.is_empty()).then(|| v.to_string());
        }
        if let Some(v) = section.get("local_max_entries") {
            config.cache.local_max_entries = parse_positive("cache", "local_max_entries", v)?;
        }
        if let Some(v) = section.get("store_timeout") {
            config.cache.store_timeout = parse_positive("cache", "store_timeout", v)?;
        }
        if let Some(v) = section.get("coalesce") {
            config.cache.coalesce = parse_bool(v);
        }
    }

    // [ttl] section
    if let Some(section) = ini.section(Some("ttl")) {
        let ttl = &mut config.ttl;
        for (key, field) in [
            ("route", &mut ttl.route),
            ("table", &mut ttl.table),
            ("trip", &mut ttl.trip),
            ("match", &mut ttl.matching),
            ("nearest", &mut ttl.nearest),
            ("reachability", &mut ttl.reachability),
        ] {
            if let Some(v) = section.get(key) {
                *field = parse_positive("ttl", key, v)?;
            }
        }
    }

    // [reachability] section
    if let Some(section) = ini.section(Some("reachability")) {
        if let Some(v) = section.get("step") {
            config.reachability.step = parse_degrees("step", v)?;
        }
        if let Some(v) = section.get("radius") {
            config.reachability.radius = parse_degrees("radius", v)?;
        }
        if let Some(v) = section.get("time_limits") {
            config.reachability.time_limits = parse_time_limits(v)?;
        }
        if let Some(v) = section.get("max_points") {
            config.reachability.max_points = parse_positive("reachability", "max_points", v)?;
        }
        if let Some(v) = section.get("max_in_flight") {
            config.reachability.max_in_flight = parse_number("reachability", "max_in_flight", v)?;
        }
        if let Some(v) = section.get("job_deadline") {
            config.reachability.job_deadline = parse_number("reachability", "job_deadline", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("logging", "file", v, "must not be empty"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + Default + PartialEq,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a positive integer"))?;
    if parsed == T::default() {
        return Err(invalid(section, key, value, "must be greater than zero"));
    }
    Ok(parsed)
}

fn parse_degrees(key: &str, value: &str) -> Result<f64, ConfigFileError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(invalid(
            "reachability",
            key,
            value,
            "must be a positive number of degrees",
        )),
    }
}

/// Comma-separated list of seconds, e.g. `300, 600, 900`.
fn parse_time_limits(value: &str) -> Result<Vec<u64>, ConfigFileError> {
    let limits = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_positive::<u64>("reachability", "time_limits", s))
        .collect::<Result<Vec<_>, _>>()?;
    if limits.is_empty() {
        return Err(invalid(
            "reachability",
            "time_limits",
            value,
            "expected at least one limit, e.g. '300, 600, 900'",
        ));
    }
    Ok(limits)
}

pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, content).unwrap();
        ConfigFile::load_from(&path)
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = load("[engine]\nurl = http://osrm:5000\n").unwrap();

        assert_eq!(config.engine.url, "http://osrm:5000");
        assert_eq!(config.engine.timeout, DEFAULT_ENGINE_TIMEOUT_SECS);
        assert_eq!(config.cache, ConfigFile::default().cache);
    }

    #[test]
    fn test_full_file() {
        let config = load(
            r#"
[engine]
url = https://routing.example.com
profile = foot
timeout = 10

[cache]
redis_url =
local_max_entries = 500
store_timeout = 1
coalesce = no

[ttl]
table = 1200
match = 60

[reachability]
step = 0.05
radius = 0.2
time_limits = 120, 240
max_points = 400
max_in_flight = 16
job_deadline = 90

[logging]
file = gateway.log
"#,
        )
        .unwrap();

        assert_eq!(config.engine.profile, Profile::Walking);
        assert_eq!(config.engine.timeout, 10);
        assert!(config.cache.redis_url.is_none());
        assert_eq!(config.cache.local_max_entries, 500);
        assert!(!config.cache.coalesce);
        assert_eq!(config.ttl.table, 1200);
        assert_eq!(config.ttl.matching, 60);
        assert_eq!(config.ttl.route, 300);
        assert_eq!(config.reachability.step, 0.05);
        assert_eq!(config.reachability.time_limits, vec![120, 240]);
        assert_eq!(config.reachability.max_in_flight, 16);
        assert_eq!(config.reachability.job_deadline, 90);
        assert_eq!(config.logging.file, "gateway.log");
    }

    #[test]
    fn test_invalid_url_rejected() {
        let err = load("[engine]\nurl = localhost:5000\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref section, ref key, .. }
                if section == "engine" && key == "url"
        ));
    }

    #[test]
    fn test_invalid_profile_rejected() {
        assert!(load("[engine]\nprofile = hovercraft\n").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load("[engine]\ntimeout = 0\n").unwrap_err();
        assert!(err.to_string().contains("engine.timeout"));
    }

    #[test]
    fn test_bad_degrees_rejected() {
        assert!(load("[reachability]\nstep = -0.01\n").is_err());
        assert!(load("[reachability]\nradius = wide\n").is_err());
    }

    #[test]
    fn test_bad_time_limits_rejected() {
        assert!(load("[reachability]\ntime_limits = 300, soon\n").is_err());
        assert!(load("[reachability]\ntime_limits = 300, 0\n").is_err());
        assert!(load("[reachability]\ntime_limits = ,\n").is_err());
    }

    #[test]
    fn test_zero_max_in_flight_allowed() {
        let config = load("[reachability]\nmax_in_flight = 0\n").unwrap();
        assert_eq!(config.reachability.max_in_flight, 0);
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("off"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/var/log"), PathBuf::from("/var/log"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs"), home.join("logs"));
        }
    }
}
