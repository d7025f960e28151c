//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_failures_total` (counter): translated handler failures by category, status
//! - `gateway_resources_provisioned` (gauge): resources built at startup
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Labels are static strings from closed sets

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one translated handler failure.
pub fn record_failure(category: &'static str, status: u16) {
    ::metrics::counter!(
        "gateway_failures_total",
        "category" => category,
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record how many resources the registry holds.
pub fn record_provisioned(count: usize) {
    ::metrics::gauge!("gateway_resources_provisioned").set(count as f64);
}
