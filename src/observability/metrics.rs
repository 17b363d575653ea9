//! Metrics collection and exposition.
//!
//! # Metrics
//! - `endpoint.requests` (counter): successful invocations per endpoint
//! - `endpoint.errors` (counter): failed, rejected or cancelled invocations
//! - `endpoint.latency` (histogram, seconds): one sample per invocation
//!
//! All three carry an `endpoint` label holding the route template.
//! Instruments are obtained through the `metrics` facade, whose recorder
//! returns the existing handle when a name and label set is already
//! registered, so concurrent first use never produces duplicates.

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram, Counter, Histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder};

pub const ENDPOINT_REQUESTS: &str = "endpoint.requests";
pub const ENDPOINT_ERRORS: &str = "endpoint.errors";
pub const ENDPOINT_LATENCY: &str = "endpoint.latency";

/// Label key attached to every endpoint instrument.
pub const ENDPOINT_LABEL: &str = "endpoint";

const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .set_buckets_for_metric(Matcher::Full(ENDPOINT_LATENCY.to_string()), LATENCY_BUCKETS)?
        .install()?;

    describe_metrics();
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_counter!(ENDPOINT_REQUESTS, "Number of requests per endpoint");
    describe_counter!(ENDPOINT_ERRORS, "Number of errors per endpoint");
    describe_histogram!(ENDPOINT_LATENCY, Unit::Seconds, "Latency per endpoint");
}

/// The three instruments kept for one endpoint.
#[derive(Clone)]
pub struct EndpointMetrics {
    pub requests: Counter,
    pub errors: Counter,
    pub latency: Histogram,
}

impl EndpointMetrics {
    /// Create or fetch the instruments for `endpoint` from the current recorder.
    pub fn resolve(endpoint: &str) -> Self {
        Self {
            requests: counter!(ENDPOINT_REQUESTS, ENDPOINT_LABEL => endpoint.to_string()),
            errors: counter!(ENDPOINT_ERRORS, ENDPOINT_LABEL => endpoint.to_string()),
            latency: histogram!(ENDPOINT_LATENCY, ENDPOINT_LABEL => endpoint.to_string()),
        }
    }
}
