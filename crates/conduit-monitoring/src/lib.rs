//! Monitoring for the Conduit flow core
//!
//! Only structured logging lives here: a subscriber with an `EnvFilter`
//! and either JSON or pretty output.

use serde::{Deserialize, Serialize};
use std::env;

pub mod logging;
pub use logging::{init_logging, LogExt};

/// Configuration for initializing logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Service name attached to the startup log line
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Log level filter (e.g., "info,conduit_core=debug")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit JSON lines instead of pretty output
    #[serde(default)]
    pub enable_json_logging: bool,
}

fn default_service_name() -> String {
    "conduit".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_filter: default_log_filter(),
            enable_json_logging: false,
        }
    }
}

impl MonitoringConfig {
    /// Defaults overridden by `CONDUIT_LOG_FILTER` and `CONDUIT_LOG_JSON`
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Ok(filter) = env::var("CONDUIT_LOG_FILTER") {
            if !filter.trim().is_empty() {
                config.log_filter = filter;
            }
        }

        if let Ok(json) = env::var("CONDUIT_LOG_JSON") {
            match json.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => config.enable_json_logging = true,
                "0" | "false" | "no" | "off" => config.enable_json_logging = false,
                // Logging is not up yet, so the warning goes straight to stderr
                other => eprintln!("Invalid CONDUIT_LOG_JSON value: {}", other),
            }
        }

        config
    }
}
