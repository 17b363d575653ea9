//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → axum stops accepting, drains connections
//!             → in-flight work waits are interrupted
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
