//! The traced unit of business work.
//!
//! Each call opens a `business.work` span, waits for the requested duration
//! and closes the span on every path:
//!
//! ```text
//! Idle → SpanOpen → Completed ─┐
//!                 → Cancelled ─┴→ SpanClosed
//! ```
//!
//! Cancellation is either the shutdown signal firing during the wait
//! (reported as [`WorkError::Interrupted`]) or the caller dropping the
//! future, in which case the span is still marked incomplete and closed.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::field::Empty;
use tracing::{info, info_span, Instrument, Span};

use crate::http::RequestContext;
use crate::lifecycle::Shutdown;
use crate::observability::tracing::{record_exception, STATUS_FIELD};
use crate::work::WorkDuration;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkError {
    #[error("work interrupted before completion")]
    Interrupted,
}

/// Result of a completed unit of work.
#[derive(Debug, Clone, Copy)]
pub struct WorkReport {
    pub requested: WorkDuration,
    pub elapsed: Duration,
}

/// Performs simulated work that can be interrupted by shutdown.
#[derive(Clone)]
pub struct WorkService {
    shutdown: Shutdown,
}

impl WorkService {
    pub fn new(shutdown: Shutdown) -> Self {
        Self { shutdown }
    }

    /// Wait for `duration` inside a traced span.
    ///
    /// The wait is a lower bound; it may overrun but never returns early
    /// unless interrupted.
    pub async fn perform_work(
        &self,
        ctx: &RequestContext,
        duration: WorkDuration,
    ) -> Result<WorkReport, WorkError> {
        let duration_ms = duration.as_millis();
        let span = info_span!(
            "business.work",
            work.duration_ms = duration_ms,
            request.id = Empty,
            work.completed = Empty,
            otel.status_code = Empty
        );

        let work_span = span.clone();
        async move {
            let span = work_span;
            let mut completion = CompletionGuard::new(span.clone());
            info!(duration_ms, "Starting business work");

            if let Some(request_id) = ctx.request_id() {
                span.record("request.id", request_id.as_str());
                info!(request_id = %request_id, "Request ID from context");
            }

            let started = Instant::now();
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => {
                    let err = WorkError::Interrupted;
                    record_exception(&span, &err);
                    completion.settle(false);
                    Err(err)
                }
                _ = tokio::time::sleep(duration.as_duration()) => {
                    completion.settle(true);
                    info!(duration_ms, "Business work completed");
                    Ok(WorkReport {
                        requested: duration,
                        elapsed: started.elapsed(),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Records `work.completed` exactly once, defaulting to `false` on drop.
struct CompletionGuard {
    span: Span,
    settled: bool,
}

impl CompletionGuard {
    fn new(span: Span) -> Self {
        Self {
            span,
            settled: false,
        }
    }

    fn settle(&mut self, completed: bool) {
        self.span.record("work.completed", completed);
        self.settled = true;
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.span.record("work.completed", false);
            self.span.record(STATUS_FIELD, "ERROR");
            tracing::warn!(parent: &self.span, "Business work abandoned before completion");
        }
    }
}
