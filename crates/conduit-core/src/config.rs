//! Configuration for the flow editing core
//!
//! Defaults, optionally overridden from a YAML document and then from
//! environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

use crate::CoreError;

/// Behaviour switches for the flow store and reducer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Reject a save while another one is in flight
    #[serde(default = "default_true")]
    pub guard_concurrent_saves: bool,

    /// JSON-encode non-string, non-number property values before storing them
    #[serde(default)]
    pub stringify_property_values: bool,

    /// Give steps without an id a generated one in the saved copy
    #[serde(default = "default_true")]
    pub assign_step_ids_on_save: bool,

    /// Append endpoint connector ids to the saved copy's tags
    #[serde(default = "default_true")]
    pub tag_connectors_on_save: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            guard_concurrent_saves: true,
            stringify_property_values: false,
            assign_step_ids_on_save: true,
            tag_connectors_on_save: true,
        }
    }
}

impl FlowConfig {
    /// Load configuration from defaults and environment variables
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml_str(raw: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Override fields from `CONDUIT_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        override_bool("CONDUIT_GUARD_CONCURRENT_SAVES", &mut self.guard_concurrent_saves);
        override_bool(
            "CONDUIT_STRINGIFY_PROPERTY_VALUES",
            &mut self.stringify_property_values,
        );
        override_bool("CONDUIT_ASSIGN_STEP_IDS", &mut self.assign_step_ids_on_save);
        override_bool("CONDUIT_TAG_CONNECTORS", &mut self.tag_connectors_on_save);
    }
}

fn override_bool(var: &str, target: &mut bool) {
    if let Ok(raw) = env::var(var) {
        match parse_bool(&raw) {
            Some(value) => *target = value,
            None => warn!("Invalid {} value: {}", var, raw),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
