//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): inbound requests by method, status
//! - `relay_request_duration_seconds` (histogram): latency distribution
//! - `relay_upstream_attempts_total` (counter): candidate attempts by outcome
//! - `relay_responses_total` (counter): relayed bodies by kind
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "relay_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("relay_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// `outcome` is one of `success`, `status`, `transport`.
pub fn record_attempt(outcome: &'static str) {
    ::metrics::counter!("relay_upstream_attempts_total", "outcome" => outcome).increment(1);
}

/// `kind` is one of `json`, `text`, `binary`.
pub fn record_body(kind: &'static str) {
    ::metrics::counter!("relay_responses_total", "kind" => kind).increment(1);
}
