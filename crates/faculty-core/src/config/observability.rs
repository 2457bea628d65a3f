use serde::{Deserialize, Serialize};

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default log filter when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
