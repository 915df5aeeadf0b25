//! Typed configuration loaded from `config.ini`.

use std::path::PathBuf;

use super::defaults::*;
use crate::query::Profile;

/// Complete configuration file contents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub engine: EngineSettings,
    pub cache: CacheSettings,
    pub ttl: TtlSettings,
    pub reachability: ReachabilitySettings,
    pub logging: LoggingSettings,
}

/// `[engine]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub url: String,
    /// Profile used when a command does not name one
    pub profile: Profile,
    /// Seconds
    pub timeout: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENGINE_URL.to_string(),
            profile: Profile::default(),
            timeout: DEFAULT_ENGINE_TIMEOUT_SECS,
        }
    }
}

/// `[cache]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// `None` runs on the local tier alone
    pub redis_url: Option<String>,
    pub local_max_entries: u64,
    /// Seconds
    pub store_timeout: u64,
    pub coalesce: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: Some(DEFAULT_REDIS_URL.to_string()),
            local_max_entries: DEFAULT_LOCAL_MAX_ENTRIES,
            store_timeout: DEFAULT_STORE_TIMEOUT_SECS,
            coalesce: true,
        }
    }
}

/// `[ttl]` section, all in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct TtlSettings {
    pub route: u64,
    pub table: u64,
    pub trip: u64,
    pub matching: u64,
    pub nearest: u64,
    pub reachability: u64,
}

impl Default for TtlSettings {
    fn default() -> Self {
        Self {
            route: 300,
            table: 600,
            trip: 300,
            matching: 300,
            nearest: 300,
            reachability: 900,
        }
    }
}

/// `[reachability]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachabilitySettings {
    /// Degrees
    pub step: f64,
    /// Degrees
    pub radius: f64,
    /// Seconds
    pub time_limits: Vec<u64>,
    pub max_points: usize,
    /// 0 = unbounded
    pub max_in_flight: usize,
    /// Seconds, 0 = none
    pub job_deadline: u64,
}

impl Default for ReachabilitySettings {
    fn default() -> Self {
        Self {
            step: DEFAULT_GRID_STEP,
            radius: DEFAULT_GRID_RADIUS,
            time_limits: DEFAULT_TIME_LIMITS.to_vec(),
            max_points: DEFAULT_MAX_POINTS,
            max_in_flight: 0,
            job_deadline: 0,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}
