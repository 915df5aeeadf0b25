//! Top-level gateway error.

use thiserror::Error;

use crate::engine::{RoutingError, TransportError};
use crate::fanout::FanOutError;
use crate::query::QueryError;

/// Errors surfaced by [`Gateway`](crate::service::Gateway) operations.
///
/// Cache tier failures never appear here; they are absorbed by the cache
/// coordinator.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Malformed query; never retried or cached.
    #[error("Invalid query: {0}")]
    Validation(#[from] QueryError),

    /// Malformed reachability job, rejected before dispatch.
    #[error("Invalid reachability request: {0}")]
    FanOut(#[from] FanOutError),

    #[error(transparent)]
    Routing(#[from] RoutingError),

    #[error("Failed to start gateway: {0}")]
    Startup(String),
}

impl GatewayError {
    /// The routing engine could not be reached.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, GatewayError::Routing(RoutingError::Transport(_)))
    }

    /// The caller's input was rejected.
    pub fn is_validation(&self) -> bool {
        matches!(self, GatewayError::Validation(_) | GatewayError::FanOut(_))
    }
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        GatewayError::Routing(err.into())
    }
}
