//! Gateway configuration.
//!
//! Settings are read from `~/.routegate/config.ini` (or a path given on the
//! command line). Missing keys fall back to defaults, and the
//! `OSRM_BACKEND_URL` / `REDIS_URL` environment variables take precedence
//! over the file.

pub mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    CacheSettings, ConfigFile, EngineSettings, LoggingSettings, ReachabilitySettings,
    TtlSettings,
};
