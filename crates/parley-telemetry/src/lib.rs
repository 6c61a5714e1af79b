//! Logging setup for Parley
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! plain-text or JSON `fmt` layer

use parley_config::{LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber from configuration
///
/// `RUST_LOG` takes precedence over the configured filter. An invalid
/// filter falls back to `info` rather than failing startup.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = build_filter(&config.filter);

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .flatten_event(true);

            registry
                .with(fmt_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to install subscriber: {e}"))?;
        }
    }

    tracing::debug!(filter = %config.filter, format = ?config.format, "logging initialized");

    Ok(())
}

/// Resolve the effective filter, preferring `RUST_LOG`
fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
