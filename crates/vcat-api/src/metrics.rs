//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "vcat_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vcat_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vcat_http_requests_in_flight";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", route_label(path).to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Collapse unknown paths so probes and scanners can't blow up label cardinality.
fn route_label(path: &str) -> &str {
    match path {
        "/concat" | "/health" | "/healthz" | "/metrics" => path,
        _ => "other",
    }
}

/// Holds the in-flight gauge up until dropped, including when the client
/// disconnects and the request future is dropped mid-flight.
struct InFlightRequest(());

impl InFlightRequest {
    fn start() -> Self {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        Self(())
    }
}

impl Drop for InFlightRequest {
    fn drop(&mut self) {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let in_flight = InFlightRequest::start();
    let response = next.run(request).await;
    drop(in_flight);

    let status = response.status().as_u16();
    record_http_request(&method, &path, status, start.elapsed().as_secs_f64());

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label() {
        assert_eq!(route_label("/concat"), "/concat");
        assert_eq!(route_label("/healthz"), "/healthz");
        assert_eq!(route_label("/wp-admin/setup.php"), "other");
    }

    #[test]
    fn test_in_flight_gauge_released_on_drop() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let abandoned = InFlightRequest::start();
            let _current = InFlightRequest::start();
            drop(abandoned);
        });

        let rendered = handle.render();
        let line = rendered
            .lines()
            .find(|l| l.starts_with(names::HTTP_REQUESTS_IN_FLIGHT))
            .unwrap();
        assert!(line.ends_with(" 1"), "unexpected gauge line: {line}");
    }
}
