//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! request boundary / handlers / business work produce:
//!     → logging.rs (structured log events, span fields flattened)
//!     → metrics.rs (per-endpoint counters and latency histogram)
//!     → tracing.rs (span helpers, exception recording)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span, so every log line carries it
//! - Instruments are created through the `metrics` facade, never cached here

pub mod logging;
pub mod metrics;
pub mod tracing;
