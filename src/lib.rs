//! Request observability layer for a small HTTP service.
//!
//! Every request gets a correlation ID (forwarded from `X-Request-Id` or
//! minted), carried explicitly into handlers and business logic and stamped
//! on the response. Routes are wrapped with per-endpoint metrics, and the
//! business operation runs inside a tracing span.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod work;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
