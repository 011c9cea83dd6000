//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use crate::core::config::LoggingConfig;
use crate::core::error::{Error, Result};

/// Install the global subscriber; `RUST_LOG` wins over the configured level
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    installed.map_err(|e| Error::config(format!("Failed to install tracing subscriber: {}", e)))
}
