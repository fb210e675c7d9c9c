//! Metrics collection and exposition.
//!
//! # Metrics
//! - `yaya_variant_attempts_total` (counter): attempts by variant and result
//! - `yaya_dispatch_total` (counter): dispatches by final result
//! - `yaya_dispatch_duration_seconds` (histogram): end-to-end dispatch latency
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one signed attempt. `result` is accepted, rejected or network_error.
pub fn record_variant_attempt(variant: &'static str, result: &'static str) {
    ::metrics::counter!("yaya_variant_attempts_total", "variant" => variant, "result" => result)
        .increment(1);
}

/// Record a finished dispatch.
pub fn record_dispatch(result: &'static str, start: Instant) {
    ::metrics::counter!("yaya_dispatch_total", "result" => result).increment(1);
    ::metrics::histogram!("yaya_dispatch_duration_seconds", "result" => result)
        .record(start.elapsed().as_secs_f64());
}
