//! Logging setup
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies to
//! this crate.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global tracing subscriber
pub fn init(config: &LoggingConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

    let json = config.format.eq_ignore_ascii_case("json");

    // stdout carries the replay output, so logs go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .try_init()
}

fn default_directive(config: &LoggingConfig) -> String {
    format!("drum={}", config.level.to_ascii_lowercase())
}
