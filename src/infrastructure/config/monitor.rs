//! Monitor settings: refresh cadence, ranking and the enabled set.

use serde::Deserialize;

use crate::adapter::outbound::DEFAULT_ENABLED;
use crate::application::{MonitorSettings, MIN_ENABLED};
use crate::domain::{AdapterId, RankingPolicy};

/// Refresh intervals offered to operators, in seconds. `0` turns polling off.
pub const REFRESH_INTERVAL_CHOICES: [u64; 5] = [0, 10, 30, 60, 300];

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Polling period for pull venues.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default)]
    pub ranking: RankingPolicy,

    /// Floor for the number of enabled adapters; at least 2.
    #[serde(default = "default_min_enabled")]
    pub min_enabled: usize,

    /// Adapters enabled at startup.
    #[serde(default = "default_enabled")]
    pub enabled: Vec<AdapterId>,

    /// Rows printed per board refresh; `0` prints all.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_min_enabled() -> usize {
    MIN_ENABLED
}

fn default_enabled() -> Vec<AdapterId> {
    DEFAULT_ENABLED.iter().map(|id| AdapterId::new(*id)).collect()
}

fn default_max_rows() -> usize {
    50
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
            ranking: RankingPolicy::default(),
            min_enabled: default_min_enabled(),
            enabled: default_enabled(),
            max_rows: default_max_rows(),
        }
    }
}

impl MonitorConfig {
    /// Whether the interval is one of [`REFRESH_INTERVAL_CHOICES`].
    #[must_use]
    pub fn has_standard_interval(&self) -> bool {
        REFRESH_INTERVAL_CHOICES.contains(&self.refresh_interval_secs)
    }

    #[must_use]
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            ranking: self.ranking,
            interval_secs: self.refresh_interval_secs,
            min_enabled: self.min_enabled,
            enabled: self.enabled.clone(),
        }
    }
}
