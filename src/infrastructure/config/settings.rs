//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application
//! settings. Every field has a default, so an empty file is a valid config.
//!
//! # Example
//!
//! ```no_run
//! use fundarb::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::logging::LoggingConfig;
use super::monitor::MonitorConfig;
use super::venues::VenuesConfig;
use crate::adapter::outbound::ADAPTER_IDS;
use crate::application::MIN_ENABLED;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Refresh cadence, ranking policy and the enabled set.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Endpoint overrides per venue.
    #[serde(default)]
    pub venues: VenuesConfig,

    /// Delay between a push venue disconnect and the next attempt.
    ///
    /// Defaults to 2000.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    2_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            monitor: MonitorConfig::default(),
            venues: VenuesConfig::default(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Also called after command-line overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        let monitor = &self.monitor;

        if monitor.min_enabled < MIN_ENABLED {
            return Err(ConfigError::InvalidValue {
                field: "min_enabled",
                reason: format!("must be at least {MIN_ENABLED}"),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for id in &monitor.enabled {
            if !ADAPTER_IDS.contains(&id.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "enabled",
                    reason: format!(
                        "unknown adapter '{id}' (expected one of {})",
                        ADAPTER_IDS.join(", ")
                    ),
                }
                .into());
            }
            if !seen.insert(id) {
                return Err(ConfigError::InvalidValue {
                    field: "enabled",
                    reason: format!("adapter '{id}' listed twice"),
                }
                .into());
            }
        }

        if monitor.enabled.len() < monitor.min_enabled {
            return Err(ConfigError::InvalidValue {
                field: "enabled",
                reason: format!(
                    "{} adapter(s) enabled, at least {} required",
                    monitor.enabled.len(),
                    monitor.min_enabled
                ),
            }
            .into());
        }

        for (key, url) in self.venues.configured() {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "url",
                    reason: format!("{key} must not be empty"),
                }
                .into());
            }
            if let Err(e) = url::Url::parse(url) {
                return Err(ConfigError::InvalidValue {
                    field: "url",
                    reason: format!("{key}: {e}"),
                }
                .into());
            }
        }

        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect_delay_ms",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    #[must_use]
    pub const fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RankingPolicy;
    use crate::error::Error;

    fn invalid_field(result: Result<Config>) -> &'static str {
        match result {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
            other => panic!("expected invalid value, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.monitor.refresh_interval_secs, 30);
        assert_eq!(config.monitor.ranking, RankingPolicy::AllProfitable);
        assert_eq!(config.monitor.min_enabled, 2);
        assert_eq!(config.monitor.enabled.len(), 4);
        assert_eq!(config.reconnect_delay(), Duration::from_secs(2));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn full_file_parses() {
        let config = Config::parse_toml(
            r#"
            reconnect_delay_ms = 500

            [logging]
            level = "debug"
            format = "json"

            [monitor]
            refresh_interval_secs = 10
            ranking = "best_per_symbol"
            enabled = ["backpack", "hyperliquid"]
            max_rows = 5

            [venues.lighter]
            directory_url = "http://localhost:8080/details"
            "#,
        )
        .unwrap();

        assert!(config.logging.is_json());
        assert_eq!(config.monitor.ranking, RankingPolicy::BestPerSymbol);
        assert_eq!(config.monitor.enabled.len(), 2);
        assert_eq!(config.venues.lighter_directory_url(), "http://localhost:8080/details");
        assert_eq!(config.venues.lighter_url(), "wss://mainnet.zklighter.elliot.ai/stream");
        assert_eq!(config.reconnect_delay_ms, 500);
    }

    #[test]
    fn rejects_floor_below_two() {
        let result = Config::parse_toml("[monitor]\nmin_enabled = 1\n");
        assert_eq!(invalid_field(result), "min_enabled");
    }

    #[test]
    fn rejects_unknown_and_duplicate_adapters() {
        let unknown = Config::parse_toml("[monitor]\nenabled = [\"backpack\", \"ftx\"]\n");
        assert_eq!(invalid_field(unknown), "enabled");

        let dup = Config::parse_toml("[monitor]\nenabled = [\"backpack\", \"backpack\"]\n");
        assert_eq!(invalid_field(dup), "enabled");
    }

    #[test]
    fn rejects_too_few_enabled() {
        let result = Config::parse_toml("[monitor]\nenabled = [\"edgex\"]\n");
        assert_eq!(invalid_field(result), "enabled");

        let raised = Config::parse_toml(
            "[monitor]\nmin_enabled = 3\nenabled = [\"edgex\", \"lighter\"]\n",
        );
        assert_eq!(invalid_field(raised), "enabled");
    }

    #[test]
    fn rejects_empty_or_malformed_urls() {
        let empty = Config::parse_toml("[venues.backpack]\nurl = \"  \"\n");
        assert_eq!(invalid_field(empty), "url");

        let malformed = Config::parse_toml("[venues.paradex]\nurl = \"not a url\"\n");
        assert_eq!(invalid_field(malformed), "url");
    }

    #[test]
    fn rejects_zero_reconnect_delay() {
        let result = Config::parse_toml("reconnect_delay_ms = 0\n");
        assert_eq!(invalid_field(result), "reconnect_delay_ms");
    }

    #[test]
    fn unknown_venue_section_is_a_parse_error() {
        let result = Config::parse_toml("[venues.ftx]\nurl = \"https://ftx.com\"\n");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn nonstandard_interval_is_accepted() {
        let config = Config::parse_toml("[monitor]\nrefresh_interval_secs = 45\n").unwrap();
        assert!(!config.monitor.has_standard_interval());
    }

    #[test]
    fn default_matches_empty_file() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.reconnect_delay_ms, 2_000);
        assert_eq!(config.monitor.max_rows, 50);
    }
}
