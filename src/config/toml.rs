//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Monitoring configuration
    #[serde(default)]
    pub monitor: MonitorSection,

    /// Output configuration
    #[serde(default)]
    pub display: DisplaySection,
}

/// Monitoring configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorSection {
    /// Fallback polling interval in seconds
    pub poll_interval: Option<u64>,

    /// Disable the fallback poll
    #[serde(default)]
    pub events_only: bool,

    /// Disable path-change events
    #[serde(default)]
    pub poll_only: bool,
}

/// Output configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySection {
    /// Port shown next to each address
    pub port: Option<u16>,

    /// Output format: "text" or "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ifaddr-monitor Configuration File

[monitor]
# Fallback polling interval in seconds, at most one week (default: 60)
# Path-change events trigger refreshes immediately; the poll catches
# changes the OS does not announce.
poll_interval = 60

# React to path-change events only, without the fallback poll
# events_only = false

# Ignore path-change events, refresh on the poll only
# poll_only = false

[display]
# Port shown next to each address (default: 31075)
# port = 31075

# Output format: "text" (one address:port per line) or "json"
# format = "text"
"#
    .to_string()
}
