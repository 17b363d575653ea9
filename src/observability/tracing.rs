//! Span helpers shared by the request boundary and the business layer.
//!
//! Spans declare every attribute up front as `Empty` and fill them with
//! `Span::record`; `tracing` ignores records for undeclared fields.

use tracing::Span;

/// Field set to `"ERROR"` on spans that observed a failure.
pub const STATUS_FIELD: &str = "otel.status_code";

/// Mark `span` as failed and attach `error` to it as an exception event.
pub fn record_exception(span: &Span, error: &(dyn std::error::Error + 'static)) {
    span.record(STATUS_FIELD, "ERROR");
    tracing::error!(
        parent: span,
        exception.message = %error,
        exception.source = error.source().map(tracing::field::display),
        "exception"
    );
}
