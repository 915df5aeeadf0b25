//! Routing engine client.
//!
//! The engine is an external HTTP service; this module turns validated
//! [`Query`](crate::query::Query) values into engine requests and engine
//! responses into JSON bodies or typed errors.
//!
//! # Error classification
//!
//! - [`TransportError`]: no response (connection refused, DNS, timeout)
//! - [`EngineError`]: a response that rejects the request (non-2xx status,
//!   result code other than `Ok`, or a body that is not a routing response)
//!
//! Both reach the caller as a [`RoutingError`].

mod client;
mod http;
#[cfg(test)]
pub(crate) mod stub;
mod types;

pub use client::{RoutingClient, DEFAULT_ENGINE_TIMEOUT};
pub use http::{AsyncHttpClient, AsyncReqwestClient, HttpResponse};
pub use types::{EngineError, RoutingError, TransportError, INVALID_RESPONSE_CODE};
