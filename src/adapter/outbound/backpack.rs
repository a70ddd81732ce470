//! Backpack: hourly funding from the mark-price endpoint.

use serde_json::Value;

use super::parse::{field_number, field_str};
use super::pull::PullVenue;
use crate::domain::{AdapterId, FundingDatum, HOUR_MS};
use crate::error::{Error, Result};

pub const ID: &str = "backpack";
pub const LABEL: &str = "Backpack";
pub const DEFAULT_URL: &str = "https://api.backpack.exchange/api/v1/markPrices";

const PERP_SUFFIX: &str = "_USDC_PERP";

/// Backpack mark-price endpoint: a JSON array of `{symbol, fundingRate, ...}`.
#[derive(Debug, Clone)]
pub struct BackpackVenue {
    id: AdapterId,
    url: String,
}

impl BackpackVenue {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: AdapterId::new(ID),
            url: url.into(),
        }
    }
}

impl Default for BackpackVenue {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// `btc_usdc_perp` → `BTC`. Symbols without the suffix are kept uppercased.
#[must_use]
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let upper = raw.to_uppercase();
    let base = upper.strip_suffix(PERP_SUFFIX).unwrap_or(&upper);
    (!base.is_empty()).then(|| base.to_string())
}

impl PullVenue for BackpackVenue {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn normalize(&self, payload: &Value) -> Result<Vec<FundingDatum>> {
        let entries = payload
            .as_array()
            .ok_or_else(|| Error::Parse("expected an array of mark prices".into()))?;

        Ok(entries
            .iter()
            .filter_map(|entry| {
                let symbol = normalize_symbol(field_str(entry, "symbol")?)?;
                let rate = field_number(entry, "fundingRate")?;
                FundingDatum::try_new(LABEL, symbol, rate, HOUR_MS as i64).ok()
            })
            .collect())
    }
}
