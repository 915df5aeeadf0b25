//! Stub routing engine for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::http::{AsyncHttpClient, HttpResponse};
use super::types::TransportError;
use crate::coord::{haversine_meters, Coordinate};

type Responder = dyn Fn(&str) -> Result<HttpResponse, TransportError> + Send + Sync;

/// HTTP client whose responses are computed from the requested URL.
#[derive(Clone)]
pub(crate) struct StubEngine {
    respond: Arc<Responder>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl StubEngine {
    pub(crate) fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            respond: Arc::new(respond),
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Answers route requests with a duration proportional to the
    /// great-circle distance between the two endpoints.
    pub(crate) fn haversine(meters_per_second: f64) -> Self {
        Self::new(move |url| {
            let (from, to) = route_endpoints(url).ok_or_else(|| {
                TransportError::Request(format!("stub cannot parse {}", url))
            })?;
            Ok(route_response(haversine_meters(&from, &to) / meters_per_second))
        })
    }

    /// Sleep (on the tokio clock) before every response.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AsyncHttpClient for StubEngine {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.respond)(url)
    }
}

/// A successful single-route response.
pub(crate) fn route_response(duration: f64) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: format!(
            r#"{{"code":"Ok","routes":[{{"duration":{},"distance":{}}}]}}"#,
            duration,
            duration * 10.0
        )
        .into_bytes(),
    }
}

/// Extracts the two endpoints of a `/route/v1/{profile}/{a};{b}` URL.
pub(crate) fn route_endpoints(url: &str) -> Option<(Coordinate, Coordinate)> {
    let path = url.split('?').next()?;
    let coords = path.rsplit('/').next()?;
    let (a, b) = coords.split_once(';')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_endpoints() {
        let (a, b) =
            route_endpoints("http://e/route/v1/driving/13.5,52.25;13.6,52.3?steps=false").unwrap();
        assert_eq!(a, Coordinate::new(13.5, 52.25).unwrap());
        assert_eq!(b, Coordinate::new(13.6, 52.3).unwrap());
        assert!(route_endpoints("http://e/nearest/v1/driving/13.5,52.25").is_none());
    }

    #[tokio::test]
    async fn test_stub_counts_calls() {
        let stub = StubEngine::haversine(10.0);
        let response = stub
            .get("http://e/route/v1/driving/0,0;0,0", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(stub.calls(), 1);
    }
}
