//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by outcome
//!   (`matched`, `not_found`, `error`)
//! - `router_dispatch_duration_seconds` (histogram): time spent in the route tree
//!
//! # Design Decisions
//! - Recorded once per request in `App::handle`; mounted trees are not counted
//! - Exporter is optional; without it the macros are no-ops

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one dispatch outcome.
pub fn record_dispatch(outcome: &'static str, start_time: Instant) {
    ::metrics::counter!("router_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("router_dispatch_duration_seconds", "outcome" => outcome)
        .record(start_time.elapsed().as_secs_f64());
}
