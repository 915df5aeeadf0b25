//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization, runtime creation and
//! gateway startup so command handlers only deal with their own arguments.

use std::future::Future;
use std::path::Path;

use tokio::runtime::Runtime;
use tracing::info;

use routegate::config::{config_file_path, ConfigFile};
use routegate::logging::{init_logging, LoggingGuard};
use routegate::{Gateway, GatewayConfig};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
    runtime: Runtime,
    gateway: Gateway,
}

impl CliRunner {
    /// Load config (file, then environment), initialize logging and start the gateway.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&path)?.apply_env_overrides();

        let logging_guard = init_logging(&config.logging.directory, &config.logging.file)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;
        info!(config = %path.display(), "routegate {}", env!("CARGO_PKG_VERSION"));

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Startup(e.to_string()))?;

        let gateway = Gateway::start(GatewayConfig::from_config_file(&config))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
            gateway,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Drive a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Log final statistics.
    pub fn shutdown(self) {
        self.gateway.shutdown();
    }
}
