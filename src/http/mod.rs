//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → middleware/boundary.rs (request ID, request span, start log)
//!     → [/work only] handlers::validate_work_request (400 on bad input)
//!     → middleware/metrics.rs (counters + latency)
//!     → handlers.rs (hello / work, context passed explicitly)
//!     → response.rs (errors → status codes)
//!     → boundary stamps X-Request-Id, end log
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestContext, RequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
