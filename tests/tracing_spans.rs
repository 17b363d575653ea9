//! Span and log assertions for the request boundary and business work.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use common::{get, test_server, Capture};

#[tokio::test]
async fn test_work_span_carries_duration_and_request_id() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    let res = get(server.router(), "/work?ms=10", Some("trace-me")).await;
    assert_eq!(res.status, StatusCode::OK);

    let spans = capture.closed_spans("business.work");
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.fields["work.duration_ms"], "10");
    assert_eq!(span.fields["request.id"], "trace-me");
    assert_eq!(span.fields["work.completed"], "true");
    assert!(!span.fields.contains_key("otel.status_code"));
    assert_eq!(capture.open_spans("business.work"), 0);
}

#[tokio::test]
async fn test_rejected_input_opens_no_work_span() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    let res = get(server.router(), "/work?ms=60001", None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    assert!(capture.closed_spans("business.work").is_empty());
    assert_eq!(capture.open_spans("business.work"), 0);
    assert!(capture.event("work api invoked").is_none());
    assert!(capture.event("work request rejected").is_some());
}

#[tokio::test]
async fn test_interrupted_work_marks_span_failed() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, shutdown) = test_server(|_| {});

    let (res, _) = tokio::join!(get(server.router(), "/work?ms=10000", None), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();
    });
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);

    let spans = capture.closed_spans("business.work");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields["work.completed"], "false");
    assert_eq!(spans[0].fields["otel.status_code"], "ERROR");

    let exception = capture.event("exception").expect("exception event");
    assert_eq!(exception.level, tracing::Level::ERROR);
    assert_eq!(exception.span.as_deref(), Some("business.work"));
    assert_eq!(
        exception.fields["exception.message"],
        "work interrupted before completion"
    );
}

#[tokio::test]
async fn test_dropped_work_still_closes_span() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    let abandoned = tokio::time::timeout(
        Duration::from_millis(30),
        get(server.router(), "/work?ms=5000", None),
    )
    .await;
    assert!(abandoned.is_err());

    let spans = capture.closed_spans("business.work");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields["work.completed"], "false");
    assert_eq!(spans[0].fields["otel.status_code"], "ERROR");
    assert_eq!(capture.open_spans("business.work"), 0);

    let aborted = capture
        .event("Request aborted before a response was produced")
        .expect("aborted end log");
    assert_eq!(aborted.level, tracing::Level::WARN);
}

#[tokio::test]
async fn test_boundary_logs_bracket_handler_logs() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    get(server.router(), "/hello", Some("ordered-1")).await;

    let incoming = capture.position("Incoming request").unwrap();
    let handler = capture.position("hello endpoint invoked").unwrap();
    let outgoing = capture.position("Outgoing response").unwrap();
    assert!(incoming < handler);
    assert!(handler < outgoing);

    let start = capture.event("Incoming request").unwrap();
    let end = capture.event("Outgoing response").unwrap();
    assert_eq!(start.fields["request_id"], "ordered-1");
    assert_eq!(end.fields["request_id"], "ordered-1");
    assert_eq!(start.fields["method"], "GET");
    assert_eq!(start.fields["uri"], "/hello");
    assert_eq!(end.fields["status"], "200");
    assert!(end.fields.contains_key("duration_ms"));
}

#[tokio::test]
async fn test_start_log_includes_query_string() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    get(server.router(), "/work?ms=5", None).await;

    let start = capture.event("Incoming request").unwrap();
    assert_eq!(start.fields["uri"], "/work");
    assert_eq!(start.fields["query_string"], "ms=5");
}

#[tokio::test]
async fn test_handler_logs_inherit_request_span() {
    let capture = Capture::default();
    let _guard = capture.install();
    let (server, _) = test_server(|_| {});

    get(server.router(), "/hello", None).await;

    let handler = capture.event("hello endpoint invoked").unwrap();
    assert_eq!(handler.span.as_deref(), Some("http.request"));

    let spans = capture.closed_spans("http.request");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields["uri"], "/hello");
    assert_eq!(capture.open_spans("http.request"), 0);
}
