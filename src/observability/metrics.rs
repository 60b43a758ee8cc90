//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_requests_total` (counter): requests by method and status
//! - `site_request_duration_seconds` (histogram): latency distribution
//! - `site_gate_redirects_total` (counter): construction-mode redirects
//! - `site_gate_config_unavailable_total` (counter): fail-open evaluations
//! - `site_login_attempts_total` (counter): login outcomes
//! - `site_rate_limited_total` (counter): denied requests by endpoint
//! - `site_active_sessions` (gauge): live admin sessions
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    let method = method.to_string();
    let status = status.to_string();
    metrics::counter!("site_requests_total", "method" => method.clone(), "status" => status.clone())
        .increment(1);
    metrics::histogram!("site_request_duration_seconds", "method" => method, "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_gate_redirect() {
    metrics::counter!("site_gate_redirects_total").increment(1);
}

pub fn record_gate_config_unavailable() {
    metrics::counter!("site_gate_config_unavailable_total").increment(1);
}

pub fn record_login_attempt(outcome: &'static str) {
    metrics::counter!("site_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited(endpoint: &'static str) {
    metrics::counter!("site_rate_limited_total", "endpoint" => endpoint).increment(1);
}

pub fn record_active_sessions(count: usize) {
    metrics::gauge!("site_active_sessions").set(count as f64);
}

/// Outermost middleware recording request count and latency.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let response = next.run(request).await;
    record_request(method.as_str(), response.status().as_u16(), start);
    response
}
