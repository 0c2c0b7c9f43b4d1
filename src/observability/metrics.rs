//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): requests by route, status
//! - `relay_request_duration_seconds` (histogram): latency distribution
//! - `relay_transfers_total` (counter): transfer attempts by outcome
//! - `relay_rpc_endpoint_up` (gauge): 1=reachable, 0=unreachable
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed HTTP request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    metrics::counter!(
        "relay_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a transfer attempt.
pub fn record_transfer(outcome: &'static str) {
    metrics::counter!("relay_transfers_total", "outcome" => outcome).increment(1);
}

/// Record whether an RPC endpoint answered.
pub fn record_rpc_health(endpoint: &str, up: bool) {
    metrics::gauge!("relay_rpc_endpoint_up", "endpoint" => endpoint.to_string())
        .set(if up { 1.0 } else { 0.0 });
}
