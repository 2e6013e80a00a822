//! Metrics collection and exposition.
//!
//! # Metrics
//! - `jsonpd_callbacks_total` (counter): callback outcomes, labelled by `outcome`
//!   (`ok`, `e_empty`, `e_toolong`, `e_reserved`, `e_invalid`)
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is optional and owns its own HTTP listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::jsonp::ValidationOutcome;

pub const CALLBACKS_TOTAL: &str = "jsonpd_callbacks_total";

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(CALLBACKS_TOTAL, "JSONP callback validation outcomes");
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

/// Count one validation outcome.
pub fn record_outcome(outcome: ValidationOutcome) {
    metrics::counter!(CALLBACKS_TOTAL, "outcome" => outcome.stat_key()).increment(1);
}
