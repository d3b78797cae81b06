//! Tracing setup for the sisuo CLI
//!
//! Usage:
//!   sisuo --debug serve              # Debug logging to console
//!   RUST_LOG=sisuo_server=debug sisuo serve
//!
//! `RUST_LOG` wins over `--debug` when set.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Default to debug level instead of info
    pub debug: bool,
}

/// Install the global console subscriber.
pub fn init(config: &TracingConfig) -> Result<()> {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
