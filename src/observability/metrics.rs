//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): local API requests by method, route, status
//! - `gateway_request_duration_seconds` (histogram): local API latency
//! - `gateway_remote_calls_total` (counter): ledger calls by operation, outcome
//! - `gateway_remote_call_duration_seconds` (histogram): ledger call latency
//! - `gateway_balance_fallbacks_total` (counter): balance queries answered with zero
//! - `gateway_deploy_poll_attempts_total` (counter): deployment status polls by outcome
//! - `gateway_rate_limited_total` (counter): requests turned away by the rate limiter
//!
//! Recording is a no-op until a recorder is installed with [`init_metrics`].

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one local API request.
pub fn record_request(method: &str, route: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("route", route.to_string()),
        ("status", status.to_string()),
    ];
    counter!("gateway_requests_total", &labels).increment(1);
    histogram!("gateway_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

/// Record one call to the ledger backend.
pub fn record_remote_call(operation: &'static str, ok: bool, start: Instant) {
    let outcome = if ok { "success" } else { "error" };
    counter!("gateway_remote_calls_total", "operation" => operation, "outcome" => outcome).increment(1);
    histogram!("gateway_remote_call_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_balance_fallback() {
    counter!("gateway_balance_fallbacks_total").increment(1);
}

/// `outcome` is one of `pending`, `deployed`, `failed`, `error`.
pub fn record_poll_attempt(outcome: &'static str) {
    counter!("gateway_deploy_poll_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_rate_limited() {
    counter!("gateway_rate_limited_total").increment(1);
}
