//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use super::cli::Cli;
use super::defaults;
use super::error::ConfigError;
use super::toml::TomlConfig;

/// How published address sets are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `address:port` line per address.
    #[default]
    Text,
    /// One JSON array of `{address, port}` objects per published set.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Port shown next to each address
    pub port: u16,

    /// Output format
    pub format: OutputFormat,

    /// Fallback polling interval
    pub poll_interval: Duration,

    /// Whether the fallback poll is disabled
    pub events_only: bool,

    /// Whether path-change events are disabled
    pub poll_only: bool,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ port: {}, format: {}, poll_interval: {}s, events_only: {}, poll_only: {} }}",
            self.port,
            self.format,
            self.poll_interval.as_secs(),
            self.events_only,
            self.poll_only,
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The port is zero
    /// - The poll interval is zero
    /// - The output format is unknown
    /// - Both `events_only` and `poll_only` are set
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let port = Self::resolve_port(cli, toml)?;

        let format = Self::resolve_format(cli, toml)?;

        let poll_interval = Self::resolve_poll_interval(cli, toml)?;

        // Flags only enable: true in either source wins
        let events_only = cli.events_only || toml.is_some_and(|t| t.monitor.events_only);
        let poll_only = cli.poll_only || toml.is_some_and(|t| t.monitor.poll_only);

        if events_only && poll_only {
            return Err(ConfigError::NoRefreshSource);
        }

        Ok(Self {
            port,
            format,
            poll_interval,
            events_only,
            poll_only,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(path)?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// The fallback poll period to run the monitor with, if any.
    #[must_use]
    pub const fn fallback_poll(&self) -> Option<Duration> {
        if self.events_only {
            None
        } else {
            Some(self.poll_interval)
        }
    }

    fn resolve_port(cli: &Cli, toml: Option<&TomlConfig>) -> Result<u16, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let port = cli
            .port
            .or_else(|| toml.and_then(|t| t.display.port))
            .unwrap_or(defaults::PORT);

        if port == 0 {
            return Err(ConfigError::InvalidPort { value: port });
        }

        Ok(port)
    }

    fn resolve_format(cli: &Cli, toml: Option<&TomlConfig>) -> Result<OutputFormat, ConfigError> {
        if let Some(format) = cli.format {
            return Ok(format.into());
        }

        toml.and_then(|t| t.display.format.as_deref())
            .map_or(Ok(OutputFormat::default()), parse_format)
    }

    fn resolve_poll_interval(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .poll_interval
            .or_else(|| toml.and_then(|t| t.monitor.poll_interval))
            .unwrap_or(defaults::POLL_INTERVAL_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "poll_interval",
                reason: "must be greater than 0".to_string(),
            });
        }

        if seconds > defaults::MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::InvalidDuration {
                field: "poll_interval",
                reason: format!(
                    "must be at most {} seconds",
                    defaults::MAX_POLL_INTERVAL_SECS
                ),
            });
        }

        Ok(Duration::from_secs(seconds))
    }
}

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let template = super::toml::default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_format(s: &str) -> Result<OutputFormat, ConfigError> {
    match s.to_lowercase().as_str() {
        "text" | "plain" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(ConfigError::InvalidFormat {
            value: s.to_string(),
        }),
    }
}
