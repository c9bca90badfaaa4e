//! Structured logging configuration.
//!
//! Library code logs through the `log` facade; the subscriber installed here
//! picks those records up alongside native `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use pl_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a rejected ledger operation
///
/// # Arguments
///
/// * `operation` - Ledger operation (`fund`, `join`, ...)
/// * `subject` - Player or tournament the operation targeted
/// * `status_code` - Status returned to the caller
/// * `reason` - Client-facing rejection message
pub fn log_rejection(operation: &str, subject: &str, status_code: u16, reason: &str) {
    if status_code >= 500 {
        tracing::error!(
            operation = operation,
            subject = subject,
            http_status = status_code,
            "LEDGER: {}",
            reason
        );
    } else {
        tracing::warn!(
            operation = operation,
            subject = subject,
            http_status = status_code,
            "LEDGER: {}",
            reason
        );
    }
}

/// Log API request/response
///
/// Requests slower than one second are raised to `warn`.
///
/// # Arguments
///
/// * `method` - HTTP method
/// * `path` - Request path
/// * `status_code` - Response status code
/// * `duration_ms` - Request duration in milliseconds
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}
