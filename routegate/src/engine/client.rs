//! Routing engine client.
//!
//! Builds the engine's URL form of a query, enforces a hard per-call timeout
//! and sorts failures into [`TransportError`] (nothing came back) and
//! [`EngineError`] (the engine answered with a rejection). Nothing is
//! retried here; callers decide what a failure means for them.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::http::{AsyncHttpClient, HttpResponse};
use super::types::{EngineError, RoutingError, TransportError};
use crate::coord::{join_coordinates, Coordinate};
use crate::query::{EndpointKind, Param, Profile, Query, RouteOptions};
use crate::telemetry::GatewayMetrics;

/// Default per-call timeout.
pub const DEFAULT_ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

/// Engine result code for success.
const OK_CODE: &str = "Ok";

/// Client for the external routing engine.
pub struct RoutingClient<C> {
    http: C,
    base_url: String,
    metrics: Arc<GatewayMetrics>,
}

impl<C: AsyncHttpClient> RoutingClient<C> {
    /// Create a client for the engine at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(http: C, base_url: impl Into<String>, metrics: Arc<GatewayMetrics>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            metrics,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Engine URL for a query:
    /// `{base}/{service}/v1/{profile}/{lng,lat;...}?{params}`.
    pub fn url_for(&self, query: &Query) -> String {
        self.build_url(
            query.kind(),
            query.profile(),
            query.coordinates(),
            &query.options().params(),
        )
    }

    fn build_url(
        &self,
        kind: EndpointKind,
        profile: Profile,
        coordinates: &[Coordinate],
        params: &[Param],
    ) -> String {
        let mut url = format!(
            "{}/{}/v1/{}/{}",
            self.base_url,
            kind.service(),
            profile.as_str(),
            join_coordinates(coordinates)
        );
        if !params.is_empty() {
            let query_string = params
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query_string);
        }
        url
    }

    /// Execute a query and return the engine's JSON response body.
    pub async fn call(&self, query: &Query, timeout: Duration) -> Result<Value, RoutingError> {
        let url = self.url_for(query);
        self.request(&url, timeout).await
    }

    /// Driving time in seconds between two points.
    ///
    /// Issues a single-pair route request without geometry or steps and
    /// reads `routes[0].duration`.
    pub async fn route_duration(
        &self,
        profile: Profile,
        from: Coordinate,
        to: Coordinate,
        timeout: Duration,
    ) -> Result<f64, RoutingError> {
        let url = self.build_url(
            EndpointKind::Route,
            profile,
            &[from, to],
            &RouteOptions::duration_only().params(),
        );
        let body = self.request(&url, timeout).await?;

        body.get("routes")
            .and_then(|routes| routes.get(0))
            .and_then(|route| route.get("duration"))
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .ok_or_else(|| {
                self.metrics.upstream_engine_error();
                EngineError::invalid_response(200, "Response has no routes[0].duration").into()
            })
    }

    async fn request(&self, url: &str, timeout: Duration) -> Result<Value, RoutingError> {
        self.metrics.upstream_request();
        trace!(url = url, "Routing engine request");

        let response = match tokio::time::timeout(timeout, self.http.get(url, timeout)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.metrics.upstream_transport_error();
                return Err(e.into());
            }
            Err(_) => {
                warn!(url = url, timeout_ms = timeout.as_millis() as u64, "Routing engine timed out");
                self.metrics.upstream_transport_error();
                return Err(TransportError::Timeout(timeout).into());
            }
        };

        classify(response).map_err(|e| {
            debug!(url = url, status = e.status, code = %e.code, "Routing engine rejected request");
            self.metrics.upstream_engine_error();
            RoutingError::Engine(e)
        })
    }
}

/// Splits a received response into a usable body or an engine rejection.
fn classify(response: HttpResponse) -> Result<Value, EngineError> {
    let status = response.status;
    let parsed = serde_json::from_slice::<Value>(&response.body);

    let body = match parsed {
        Ok(body) => body,
        Err(e) if response.is_success() => {
            return Err(EngineError::invalid_response(
                status,
                format!("Response is not valid JSON: {}", e),
            ));
        }
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body);
            return Err(EngineError {
                status,
                code: "HttpError".to_string(),
                message: text.chars().take(200).collect(),
            });
        }
    };

    let code = body.get("code").and_then(Value::as_str);
    if response.is_success() && code == Some(OK_CODE) {
        return Ok(body);
    }

    Err(EngineError {
        status,
        code: code.unwrap_or(super::types::INVALID_RESPONSE_CODE).to_string(),
        message: body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No message")
            .to_string(),
    })
}
