use anyhow::Result;
use tracing_subscriber::EnvFilter;

use faculty_core::config::ObservabilityConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. `verbose` raises
/// the configured level to `debug`.
pub fn init(config: &ObservabilityConfig, verbose: bool) -> Result<()> {
    let filter = env_filter(config, verbose)?;

    let result = if config.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

fn env_filter(config: &ObservabilityConfig, verbose: bool) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let level = if verbose { "debug" } else { config.log_level.as_str() };
    EnvFilter::try_new(level).map_err(|e| anyhow::anyhow!("Invalid log level '{}': {}", level, e))
}
