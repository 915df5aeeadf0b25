//! Routing client error types.

use std::time::Duration;

use thiserror::Error;

/// Engine code used when a response could not be interpreted.
pub const INVALID_RESPONSE_CODE: &str = "InvalidResponse";

/// The routing engine could not be reached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("Routing engine timed out after {0:?}")]
    Timeout(Duration),

    #[error("Could not connect to routing engine: {0}")]
    Connect(String),

    #[error("Request to routing engine failed: {0}")]
    Request(String),
}

/// The routing engine answered, but rejected the request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Routing engine returned {code} (HTTP {status}): {message}")]
pub struct EngineError {
    /// HTTP status of the engine's response
    pub status: u16,
    /// Engine result code (e.g. `NoRoute`, `InvalidQuery`)
    pub code: String,
    pub message: String,
}

impl EngineError {
    pub(crate) fn invalid_response(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: INVALID_RESPONSE_CODE.to_string(),
            message: message.into(),
        }
    }

    /// Whether the engine's body could not be read as a routing response.
    pub fn is_invalid_response(&self) -> bool {
        self.code == INVALID_RESPONSE_CODE
    }
}

/// Failure of a single routing engine call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RoutingError {
    pub fn is_transport(&self) -> bool {
        matches!(self, RoutingError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_display() {
        let err = EngineError {
            status: 400,
            code: "NoRoute".to_string(),
            message: "Impossible route between points".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Routing engine returned NoRoute (HTTP 400): Impossible route between points"
        );
    }

    #[test]
    fn test_routing_error_kinds() {
        let transport: RoutingError = TransportError::Timeout(Duration::from_secs(30)).into();
        assert!(transport.is_transport());

        let engine: RoutingError = EngineError::invalid_response(200, "not json").into();
        assert!(!engine.is_transport());
        assert!(matches!(engine, RoutingError::Engine(ref e) if e.is_invalid_response()));
    }
}
