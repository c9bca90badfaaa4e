//! Prometheus metrics for ledger health and throughput.
//!
//! Metrics are exposed in Prometheus text format on a separate listener when
//! `METRICS_BIND` is set. Without an installed recorder every call here is a
//! no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use pl_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("GET", "/balance", 200);
//! metrics::ledger_operations_total("fund", "ok");
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Count a ledger operation by outcome (`ok` or the error kind).
pub fn ledger_operations_total(operation: &'static str, outcome: &'static str) {
    metrics::counter!("ledger_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

/// Record minor units moved by a committed operation.
pub fn points_moved(operation: &'static str, minor_units: i64) {
    metrics::counter!("points_moved_total",
        "operation" => operation
    )
    .increment(minor_units.unsigned_abs());
}

/// Record how many accounts a finish paid.
pub fn settlement_credits(count: usize) {
    metrics::histogram!("settlement_credits").record(count as f64);
}
