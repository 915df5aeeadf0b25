//! CLI error types.

use std::fmt;
use std::process;

use routegate::config::ConfigFileError;
use routegate::GatewayError;

/// Errors that end a CLI invocation.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the gateway or its runtime
    Startup(String),
    /// Command-line arguments that do not form a valid request
    InvalidArgument(String),
    /// The gateway rejected or failed the request
    Gateway(GatewayError),
    /// Failed to render output
    Output(serde_json::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Gateway(e) if e.is_service_unavailable() => {
                eprintln!();
                eprintln!("The routing engine could not be reached. Make sure:");
                eprintln!("  1. The engine is running");
                eprintln!("  2. engine.url in config.ini (or OSRM_BACKEND_URL) points at it");
                process::exit(3)
            }
            CliError::Gateway(e) if e.is_validation() => process::exit(2),
            CliError::InvalidArgument(_) => process::exit(2),
            _ => process::exit(1),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Startup(msg) => write!(f, "Failed to start: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Gateway(e) => write!(f, "{}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Gateway(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<GatewayError> for CliError {
    fn from(e: GatewayError) -> Self {
        CliError::Gateway(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e)
    }
}
