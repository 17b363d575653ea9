//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! every section falls back to its defaults, so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Upper bound for a single `/work` request, in milliseconds.
pub const MAX_WORK_MS: u64 = 60_000;

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Bounds for the simulated business work.
    pub work: WorkConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        // Long enough for the largest permitted work request.
        Self { request_secs: 75 }
    }
}

/// Bounds applied to `/work?ms=`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkConfig {
    /// Duration used when `ms` is omitted.
    pub default_ms: u64,

    /// Largest accepted duration (inclusive).
    pub max_ms: u64,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            default_ms: 250,
            max_ms: MAX_WORK_MS,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Scrape endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
