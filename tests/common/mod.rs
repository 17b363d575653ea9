//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use metrics_util::debugging::{DebugValue, Snapshotter};
use request_observability::config::ServiceConfig;
use request_observability::http::X_REQUEST_ID;
use request_observability::{HttpServer, Shutdown};
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

/// Build a server with metrics export disabled.
pub fn test_server(configure: impl FnOnce(&mut ServiceConfig)) -> (HttpServer, Shutdown) {
    let mut config = ServiceConfig::default();
    config.observability.metrics_enabled = false;
    configure(&mut config);

    let shutdown = Shutdown::new();
    (HttpServer::new(config, shutdown.clone()), shutdown)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

impl TestResponse {
    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .expect("X-Request-Id header")
            .to_str()
            .unwrap()
    }
}

/// Send a GET through the in-process router.
pub async fn get(router: Router, uri: &str, request_id: Option<&str>) -> TestResponse {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = request_id {
        builder = builder.header(X_REQUEST_ID, id);
    }
    send(router, builder.body(Body::empty()).unwrap()).await
}

/// Send an arbitrary request through the in-process router.
pub async fn send(router: Router, request: Request<Body>) -> TestResponse {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// One drained snapshot keyed by (metric name, endpoint label).
pub struct MetricValues(HashMap<(String, String), DebugValue>);

impl MetricValues {
    pub fn take(snapshotter: &Snapshotter) -> Self {
        Self(
            snapshotter
                .snapshot()
                .into_vec()
                .into_iter()
                .filter_map(|(key, _, _, value)| {
                    let endpoint = key
                        .key()
                        .labels()
                        .find(|l| l.key() == "endpoint")?
                        .value()
                        .to_string();
                    Some(((key.key().name().to_string(), endpoint), value))
                })
                .collect(),
        )
    }

    pub fn counter(&self, name: &str, endpoint: &str) -> u64 {
        match self.0.get(&(name.to_string(), endpoint.to_string())) {
            Some(DebugValue::Counter(count)) => *count,
            _ => 0,
        }
    }

    pub fn samples(&self, name: &str, endpoint: &str) -> usize {
        match self.0.get(&(name.to_string(), endpoint.to_string())) {
            Some(DebugValue::Histogram(samples)) => samples.len(),
            _ => 0,
        }
    }

    pub fn has_endpoint(&self, endpoint: &str) -> bool {
        self.0.keys().any(|(_, label)| label == endpoint)
    }
}

// ============================================================================
// Tracing capture
// ============================================================================

#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: String,
    pub fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub message: String,
    pub level: tracing::Level,
    pub span: Option<String>,
    pub fields: HashMap<String, String>,
}

#[derive(Default)]
struct CaptureState {
    open: HashMap<u64, CapturedSpan>,
    closed: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

/// Layer that records spans (with their final fields) and events.
#[derive(Clone, Default)]
pub struct Capture {
    state: Arc<Mutex<CaptureState>>,
}

impl Capture {
    /// Install as the thread's default subscriber until the guard drops.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        use tracing_subscriber::layer::SubscriberExt;
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn closed_spans(&self, name: &str) -> Vec<CapturedSpan> {
        let state = self.state.lock().unwrap();
        state
            .closed
            .iter()
            .filter(|span| span.name == name)
            .cloned()
            .collect()
    }

    pub fn open_spans(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.open.values().filter(|span| span.name == name).count()
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn event(&self, message: &str) -> Option<CapturedEvent> {
        self.events().into_iter().find(|e| e.message == message)
    }

    pub fn position(&self, message: &str) -> Option<usize> {
        self.events().iter().position(|e| e.message == message)
    }
}

struct FieldVisitor<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, _ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        attrs.record(&mut FieldVisitor(&mut fields));
        self.state.lock().unwrap().open.insert(
            id.into_u64(),
            CapturedSpan {
                name: attrs.metadata().name().to_string(),
                fields,
            },
        );
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, _ctx: Context<'_, S>) {
        let mut state = self.state.lock().unwrap();
        if let Some(span) = state.open.get_mut(&id.into_u64()) {
            values.record(&mut FieldVisitor(&mut span.fields));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = fields.remove("message").unwrap_or_default();
        let span = ctx.event_span(event).map(|span| span.name().to_string());

        self.state.lock().unwrap().events.push(CapturedEvent {
            message,
            level: *event.metadata().level(),
            span,
            fields,
        });
    }

    fn on_close(&self, id: Id, _ctx: Context<'_, S>) {
        let mut state = self.state.lock().unwrap();
        if let Some(span) = state.open.remove(&id.into_u64()) {
            state.closed.push(span);
        }
    }
}
