//! Structured logging.
//!
//! `RUST_LOG` takes precedence over the configured level. The JSON format
//! flattens the current span's fields into every line, which is how the
//! request span's `request_id` reaches log events emitted by handlers.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format.as_str() {
        "json" => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init(),
        _ => registry.with(fmt::layer()).try_init(),
    }
}
