//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and addresses.
//! Every violation is reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, MAX_WORK_MS};

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,

    #[error("work.max_ms must not exceed {limit} (got {value})")]
    WorkBoundTooLarge { value: u64, limit: u64 },

    #[error("work.default_ms ({default_ms}) must not exceed work.max_ms ({max_ms})")]
    DefaultAboveMax { default_ms: u64, max_ms: u64 },

    #[error("observability.log_format must be \"pretty\" or \"json\" (got {0:?})")]
    UnknownLogFormat(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.work.max_ms > MAX_WORK_MS {
        errors.push(ValidationError::WorkBoundTooLarge {
            value: config.work.max_ms,
            limit: MAX_WORK_MS,
        });
    }

    if config.work.default_ms > config.work.max_ms {
        errors.push(ValidationError::DefaultAboveMax {
            default_ms: config.work.default_ms,
            max_ms: config.work.max_ms,
        });
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
