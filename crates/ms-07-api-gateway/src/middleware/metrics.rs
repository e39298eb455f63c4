//! Request metrics for the gateway.
//!
//! Exposed as JSON on `/metrics`, or in Prometheus text format when the
//! `metrics` feature is enabled.

use axum::http::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// API Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_client_error: AtomicU64,
    pub requests_server_error: AtomicU64,

    // Requests cut off by the timeout layer
    pub requests_timed_out: AtomicU64,

    // Requests currently being handled
    pub in_flight: AtomicU64,

    // Latency tracking (simplified - in production use histograms)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, status: StatusCode, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if status == StatusCode::REQUEST_TIMEOUT {
            self.requests_timed_out.fetch_add(1, Ordering::Relaxed);
        }

        if status.is_server_error() {
            self.requests_server_error.fetch_add(1, Ordering::Relaxed);
        } else if status.is_client_error() {
            self.requests_client_error.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms
            .fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics in Prometheus format
    #[cfg(feature = "metrics")]
    pub fn to_prometheus(&self) -> String {
        let mut output = String::new();

        let counters = [
            (
                "mesh_gateway_requests_total",
                "Total number of API requests",
                &self.requests_total,
            ),
            (
                "mesh_gateway_requests_success_total",
                "Requests answered with a non-error status",
                &self.requests_success,
            ),
            (
                "mesh_gateway_requests_client_error_total",
                "Requests answered with a 4xx status",
                &self.requests_client_error,
            ),
            (
                "mesh_gateway_requests_server_error_total",
                "Requests answered with a 5xx status",
                &self.requests_server_error,
            ),
            (
                "mesh_gateway_requests_timed_out_total",
                "Requests cut off by the request timeout",
                &self.requests_timed_out,
            ),
        ];
        for (name, help, value) in counters {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} counter\n{name} {}\n",
                value.load(Ordering::Relaxed)
            ));
        }

        output.push_str(&format!(
            "# HELP mesh_gateway_in_flight_requests Requests currently being handled\n\
             # TYPE mesh_gateway_in_flight_requests gauge\n\
             mesh_gateway_in_flight_requests {}\n",
            self.in_flight.load(Ordering::Relaxed)
        ));

        output.push_str(&format!(
            "# HELP mesh_gateway_average_latency_ms Average request latency\n\
             # TYPE mesh_gateway_average_latency_ms gauge\n\
             mesh_gateway_average_latency_ms {:.2}\n",
            self.average_latency_ms()
        ));

        output
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "client_error": self.requests_client_error.load(Ordering::Relaxed),
                "server_error": self.requests_server_error.load(Ordering::Relaxed),
                "timed_out": self.requests_timed_out.load(Ordering::Relaxed),
                "in_flight": self.in_flight.load(Ordering::Relaxed),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
///
/// Counts the request as in flight until [`finish`](Self::finish) or drop.
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
    finished: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        metrics.in_flight.fetch_add(1, Ordering::Relaxed);
        Self {
            start: Instant::now(),
            metrics,
            finished: false,
        }
    }

    /// Record the request with its final status; returns the latency in ms.
    pub fn finish(mut self, status: StatusCode) -> u64 {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics.record_request(status, latency_ms);
        self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
        self.finished = true;
        latency_ms
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        // Request future dropped before producing a response
        if !self.finished {
            self.metrics.in_flight.fetch_sub(1, Ordering::Relaxed);
        }
    }
}
