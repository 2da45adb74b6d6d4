//! tracing subscriber setup

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Build the filter: `RUST_LOG` wins, then `level`
pub fn build_env_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = level.trim().to_lowercase();
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    EnvFilter::try_new(&level).map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))
}

/// Install a stderr text subscriber.
///
/// stdout is reserved for command output so `--json` stays parseable.
/// Calling this twice keeps the first subscriber.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = build_env_filter(level)?;

    let installed = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
