//! Handler for `check config`.

use std::path::Path;

use crate::adapter::inbound::cli::output;
use crate::domain::AdapterId;
use crate::error::Result;
use crate::infrastructure::config::{Config, REFRESH_INTERVAL_CHOICES};

/// Validate a configuration file without starting any adapter.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    let monitor = &config.monitor;
    output::field("Enabled", join_ids(&monitor.enabled));
    output::field("Min enabled", monitor.min_enabled);
    output::field("Ranking", monitor.ranking);
    output::field("Interval", format_interval(monitor.refresh_interval_secs));
    output::field("Reconnect", format!("{}ms", config.reconnect_delay_ms));
    output::field("Max rows", monitor.max_rows);
    output::field("Log format", &config.logging.format);

    if !monitor.has_standard_interval() {
        output::warning(&format!(
            "refresh interval {}s is not one of {:?}",
            monitor.refresh_interval_secs, REFRESH_INTERVAL_CHOICES
        ));
    }

    for (key, url) in config.venues.configured() {
        output::field("Endpoint", format!("{key} = {url}"));
    }

    output::success("Configuration check complete");
    Ok(())
}

fn join_ids(ids: &[AdapterId]) -> String {
    ids.iter()
        .map(AdapterId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `0` means polling is off.
fn format_interval(secs: u64) -> String {
    if secs == 0 {
        "off".to_string()
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_zero_reads_as_off() {
        assert_eq!(format_interval(0), "off");
        assert_eq!(format_interval(30), "30s");
    }

    #[test]
    fn ids_are_comma_joined() {
        let ids = vec![AdapterId::new("lighter"), AdapterId::new("edgex")];
        assert_eq!(join_ids(&ids), "lighter, edgex");
        assert_eq!(join_ids(&[]), "");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = execute_config("/nonexistent/fundarb.toml").unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
