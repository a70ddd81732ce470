//! Per-venue endpoint overrides.
//!
//! Every URL is optional; unset entries use the venue's public endpoint.
//! Pointing a URL at a proxy is the supported way to route traffic through
//! one.

use serde::Deserialize;

use crate::adapter::outbound::{backpack, edgex, hyperliquid, lighter, paradex};

/// `[venues.<id>]` for venues with a single endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenueEndpoint {
    pub url: Option<String>,
}

/// `[venues.lighter]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LighterEndpoint {
    pub url: Option<String>,
    /// Market directory endpoint.
    pub directory_url: Option<String>,
}

/// `[venues]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VenuesConfig {
    #[serde(default)]
    pub backpack: VenueEndpoint,
    #[serde(default)]
    pub hyperliquid: VenueEndpoint,
    #[serde(default)]
    pub edgex: VenueEndpoint,
    #[serde(default)]
    pub paradex: VenueEndpoint,
    #[serde(default)]
    pub lighter: LighterEndpoint,
}

fn or_default(url: &Option<String>, default: &str) -> String {
    url.clone().unwrap_or_else(|| default.to_string())
}

impl VenuesConfig {
    #[must_use]
    pub fn backpack_url(&self) -> String {
        or_default(&self.backpack.url, backpack::DEFAULT_URL)
    }

    #[must_use]
    pub fn hyperliquid_url(&self) -> String {
        or_default(&self.hyperliquid.url, hyperliquid::DEFAULT_URL)
    }

    /// Base stream URL; the connection timestamp is appended per attempt.
    #[must_use]
    pub fn edgex_url(&self) -> String {
        or_default(&self.edgex.url, edgex::DEFAULT_URL)
    }

    #[must_use]
    pub fn paradex_url(&self) -> String {
        or_default(&self.paradex.url, paradex::DEFAULT_URL)
    }

    #[must_use]
    pub fn lighter_url(&self) -> String {
        or_default(&self.lighter.url, lighter::DEFAULT_URL)
    }

    #[must_use]
    pub fn lighter_directory_url(&self) -> String {
        or_default(&self.lighter.directory_url, lighter::DEFAULT_DIRECTORY_URL)
    }

    /// Every explicitly configured URL with its config key.
    pub(crate) fn configured(&self) -> Vec<(&'static str, &str)> {
        [
            ("venues.backpack.url", &self.backpack.url),
            ("venues.hyperliquid.url", &self.hyperliquid.url),
            ("venues.edgex.url", &self.edgex.url),
            ("venues.paradex.url", &self.paradex.url),
            ("venues.lighter.url", &self.lighter.url),
            ("venues.lighter.directory_url", &self.lighter.directory_url),
        ]
        .into_iter()
        .filter_map(|(key, url)| url.as_deref().map(|u| (key, u)))
        .collect()
    }
}
