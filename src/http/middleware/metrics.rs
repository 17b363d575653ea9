//! Per-endpoint metrics layer.
//!
//! Attach to a route's method router at startup:
//!
//! ```ignore
//! .route("/work", get(work).layer(MetricsLayer::new("/work")))
//! ```
//!
//! Each invocation resolves `endpoint.requests`, `endpoint.errors` and
//! `endpoint.latency` for the endpoint label, starts a timer and calls the
//! wrapped service. An `Err`, or a 4xx/5xx response, counts as an error;
//! anything else counts as a request. The latency sample is recorded by the
//! timer's `Drop`, so it happens exactly once even when the future is dropped
//! mid-flight (which is also counted as an error). The wrapped service's
//! response or error is returned unchanged.

use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::observability::metrics::EndpointMetrics;

/// Label used when a request reaches the layer without a matched route.
pub const UNMATCHED_ENDPOINT: &str = "unmatched";

#[derive(Debug, Clone)]
enum EndpointLabel {
    Fixed(Arc<str>),
    MatchedPath,
}

impl EndpointLabel {
    /// Depends only on the route definition, never on the concrete URI.
    fn resolve<B>(&self, request: &Request<B>) -> Arc<str> {
        match self {
            EndpointLabel::Fixed(label) => label.clone(),
            EndpointLabel::MatchedPath => request
                .extensions()
                .get::<MatchedPath>()
                .map(|path| Arc::from(path.as_str()))
                .unwrap_or_else(|| Arc::from(UNMATCHED_ENDPOINT)),
        }
    }
}

/// Layer that records endpoint metrics around the wrapped service.
#[derive(Debug, Clone)]
pub struct MetricsLayer {
    label: EndpointLabel,
}

impl MetricsLayer {
    /// Record under a fixed endpoint label.
    pub fn new(endpoint: impl Into<Arc<str>>) -> Self {
        Self {
            label: EndpointLabel::Fixed(endpoint.into()),
        }
    }

    /// Record under the route template axum matched (e.g. `/items/{id}`).
    pub fn from_matched_path() -> Self {
        Self {
            label: EndpointLabel::MatchedPath,
        }
    }
}

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsService {
            inner,
            label: self.label.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsService<S> {
    inner: S,
    label: EndpointLabel,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let endpoint = self.label.resolve(&request);
        let timer = LatencyTimer::start(endpoint);
        let future = self.inner.call(request);

        Box::pin(async move {
            let result = future.await;
            match &result {
                Ok(response) if !is_failure(response.status()) => timer.succeed(),
                _ => timer.fail(),
            }
            result
        })
    }
}

fn is_failure(status: StatusCode) -> bool {
    status.is_client_error() || status.is_server_error()
}

/// Counts the outcome, then records latency once on drop.
struct LatencyTimer {
    endpoint: Arc<str>,
    metrics: EndpointMetrics,
    started: Instant,
    settled: bool,
}

impl LatencyTimer {
    fn start(endpoint: Arc<str>) -> Self {
        Self {
            metrics: EndpointMetrics::resolve(&endpoint),
            endpoint,
            started: Instant::now(),
            settled: false,
        }
    }

    fn succeed(mut self) {
        self.metrics.requests.increment(1);
        self.settled = true;
    }

    fn fail(mut self) {
        self.metrics.errors.increment(1);
        self.settled = true;
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        if !self.settled {
            self.metrics.errors.increment(1);
            tracing::debug!(endpoint = %self.endpoint, "Invocation dropped before completion");
        }
        self.metrics.latency.record(self.started.elapsed());
    }
}
