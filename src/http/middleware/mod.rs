//! Cross-cutting middleware.
//!
//! - `boundary`: correlation ID, request span, start/end logs (router-wide)
//! - `metrics`: per-endpoint counters and latency (per route)

pub mod boundary;
pub mod metrics;

pub use boundary::request_boundary;
pub use metrics::{MetricsLayer, MetricsService};
