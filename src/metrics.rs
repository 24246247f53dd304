//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("eli5cast_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");

    // Upstream Metrics
    pub static ref UPSTREAM_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("eli5cast_upstream_requests_total", "Total number of calls to outside APIs"),
        &["api", "status"]
    ).expect("metric can be created");
    pub static ref UPSTREAM_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "eli5cast_upstream_request_duration_seconds",
            "Outside API call duration in seconds"
        ).buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["api"]
    ).expect("metric can be created");

    // Session Metrics
    pub static ref EXPLANATIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("eli5cast_explanations_total", "Explanation requests by outcome"),
        &["outcome"]
    ).expect("metric can be created");
    pub static ref STALE_RESULTS_DROPPED_TOTAL: IntCounter = IntCounter::new(
        "eli5cast_stale_results_dropped_total",
        "Call results discarded because a newer action had started"
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("eli5cast_errors_total", "Total number of errors"),
        &["error_type", "endpoint"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Safe to call more than once; repeated registrations are ignored.
pub fn init_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(UPSTREAM_REQUESTS_TOTAL.clone()),
        Box::new(UPSTREAM_REQUEST_DURATION_SECONDS.clone()),
        Box::new(EXPLANATIONS_TOTAL.clone()),
        Box::new(STALE_RESULTS_DROPPED_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(error) => tracing::warn!(%error, "Failed to register metric"),
        }
    }

    tracing::info!("Metrics registry initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_metrics();
        init_metrics();

        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&["neynar", "200"])
            .inc();
        let families = REGISTRY.gather();
        assert!(
            families
                .iter()
                .any(|family| family.get_name() == "eli5cast_upstream_requests_total")
        );
    }
}
