//! Metrics collection and exposition.
//!
//! # Metrics
//! - `simulator_requests_total` (counter): shaped responses by status
//! - `simulator_request_duration_seconds` (histogram): latency including the
//!   artificial delay
//! - `simulator_rejected_requests_total` (counter): invalid parameters by name
//!
//! Recording is a no-op until `init_metrics` installs a recorder.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint started");
    Ok(())
}

/// Record a completed, shaped request.
pub fn record_request(status: u16, start: Instant) {
    metrics::counter!("simulator_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("simulator_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request rejected during parameter validation.
pub fn record_rejection(param: &'static str) {
    metrics::counter!("simulator_rejected_requests_total", "param" => param).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_request(200, Instant::now());
        record_rejection("time");
    }
}
