//! Business work subsystem.
//!
//! # Data Flow
//! ```text
//! /work query
//!     → duration.rs (bounds check, before any instrumentation)
//!     → service.rs (traced, interruptible wait)
//! ```

pub mod duration;
pub mod service;

pub use duration::{DurationError, WorkDuration};
pub use service::{WorkError, WorkReport, WorkService};
