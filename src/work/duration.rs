//! Validated duration for a unit of simulated work.

use std::time::Duration;

use thiserror::Error;

use crate::config::WorkConfig;

/// Why a requested duration was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("ms must be between 0 and {max}")]
    OutOfRange { requested: i64, max: u64 },

    #[error("ms must be an integer")]
    NotAnInteger,
}

/// A duration known to lie within the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkDuration(u64);

impl WorkDuration {
    /// Validate the raw `ms` query value, substituting the default when absent.
    pub fn parse(requested: Option<i64>, limits: &WorkConfig) -> Result<Self, DurationError> {
        let Some(requested) = requested else {
            return Ok(Self(limits.default_ms));
        };

        u64::try_from(requested)
            .ok()
            .filter(|ms| *ms <= limits.max_ms)
            .map(Self)
            .ok_or(DurationError::OutOfRange {
                requested,
                max: limits.max_ms,
            })
    }

    /// Like [`WorkDuration::parse`], from the textual query value. A blank
    /// value counts as absent.
    pub fn from_query(raw: Option<&str>, limits: &WorkConfig) -> Result<Self, DurationError> {
        let requested = match raw.map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                value
                    .parse::<i64>()
                    .map_err(|_| DurationError::NotAnInteger)?,
            ),
        };
        Self::parse(requested, limits)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}
