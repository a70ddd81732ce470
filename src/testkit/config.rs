//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::application::MonitorSettings;
use crate::domain::{AdapterId, RankingPolicy};
use crate::infrastructure::config::Config;

/// Default config with a short reconnect delay.
pub fn config() -> Config {
    Config {
        reconnect_delay_ms: 10,
        ..Config::default()
    }
}

/// Default config with `enabled` as the startup selection.
pub fn with_enabled(enabled: &[&str]) -> Config {
    let mut config = config();
    config.monitor.enabled = ids(enabled);
    config
}

/// Monitor settings with the default floor and a 30s interval.
pub fn settings(enabled: &[&str], ranking: RankingPolicy) -> MonitorSettings {
    MonitorSettings {
        ranking,
        interval_secs: 30,
        min_enabled: 2,
        enabled: ids(enabled),
    }
}

pub fn ids(ids: &[&str]) -> Vec<AdapterId> {
    ids.iter().map(|id| AdapterId::new(*id)).collect()
}
