//! Request boundary middleware.
//!
//! Outermost layer of the router. For every request it:
//! 1. resolves the correlation identifier (`X-Request-Id` or a new UUID v4)
//! 2. stores a [`RequestContext`] in the request extensions
//! 3. opens the `http.request` span that every downstream log line inherits
//! 4. logs `Incoming request`, runs the rest of the stack, stamps
//!    `X-Request-Id` on the response and logs `Outgoing response`
//!
//! The response is never altered beyond the header. If the request future
//! is dropped (client gone, server shutting down) the [`RequestLog`] guard
//! still emits the end event with the partial duration.

use std::time::Instant;

use axum::{
    body::HttpBody,
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{info, info_span, Instrument};

use crate::http::request::{RequestContext, RequestId, X_REQUEST_ID};

pub async fn request_boundary(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::resolve(request.headers());
    request
        .extensions_mut()
        .insert(RequestContext::new(request_id.clone()));

    let span = info_span!(
        "http.request",
        method = %request.method(),
        uri = %request.uri().path(),
        request_id = %request_id
    );

    async move {
        let mut log = RequestLog::start(&request, request_id.clone());

        let mut response = next.run(request).await;
        if let Some(value) = request_id.to_header_value() {
            response.headers_mut().insert(X_REQUEST_ID, value);
        }

        log.finish(&response);
        response
    }
    .instrument(span)
    .await
}

/// Start/end log events for one request.
struct RequestLog {
    method: Method,
    uri: String,
    request_id: RequestId,
    started: Instant,
    finished: bool,
}

impl RequestLog {
    fn start(request: &Request, request_id: RequestId) -> Self {
        let log = Self {
            method: request.method().clone(),
            uri: request.uri().path().to_string(),
            request_id,
            started: Instant::now(),
            finished: false,
        };

        info!(
            method = %log.method,
            uri = %log.uri,
            query_string = request.uri().query(),
            request_id = %log.request_id,
            "Incoming request"
        );
        log
    }

    fn finish(&mut self, response: &Response) {
        self.finished = true;
        self.emit_end(Some(response.status()), response.body().size_hint().exact());
    }

    fn emit_end(&self, status: Option<StatusCode>, response_bytes: Option<u64>) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        match status {
            Some(status) => info!(
                method = %self.method,
                uri = %self.uri,
                status = status.as_u16(),
                duration_ms,
                response_bytes,
                request_id = %self.request_id,
                "Outgoing response"
            ),
            None => tracing::warn!(
                method = %self.method,
                uri = %self.uri,
                duration_ms,
                request_id = %self.request_id,
                "Request aborted before a response was produced"
            ),
        }
    }
}

impl Drop for RequestLog {
    fn drop(&mut self) {
        if !self.finished {
            self.emit_end(None, None);
        }
    }
}
