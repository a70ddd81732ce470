//! Hyperliquid: eight-hour funding from an aggregated funding-rates endpoint.
//!
//! The upstream lists rates for several venues; entries tagged with another
//! exchange are ignored. An explicit `periodMs` overrides the native period.

use serde_json::Value;

use super::parse::{field_number, field_str};
use super::pull::PullVenue;
use crate::domain::{AdapterId, FundingDatum, HOUR_MS};
use crate::error::{Error, Result};

pub const ID: &str = "hyperliquid";
pub const LABEL: &str = "Hyperliquid";
pub const DEFAULT_URL: &str = "https://mainnet.zklighter.elliot.ai/api/v1/funding-rates";

const NATIVE_PERIOD_MS: u64 = 8 * HOUR_MS;

/// Funding-rates endpoint: `{funding_rates: [{exchange?, symbol, rate, periodMs?}]}`.
#[derive(Debug, Clone)]
pub struct HyperliquidVenue {
    id: AdapterId,
    url: String,
}

impl HyperliquidVenue {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: AdapterId::new(ID),
            url: url.into(),
        }
    }
}

impl Default for HyperliquidVenue {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

fn normalize_entry(entry: &Value) -> Option<FundingDatum> {
    if let Some(exchange) = field_str(entry, "exchange") {
        if !exchange.eq_ignore_ascii_case(ID) {
            return None;
        }
    }

    let symbol = field_str(entry, "symbol")?.to_uppercase();
    let rate = entry.get("rate")?.as_f64()?;
    let period_ms = match entry.get("periodMs") {
        None | Some(Value::Null) => NATIVE_PERIOD_MS as i64,
        Some(_) => field_number(entry, "periodMs")?.round() as i64,
    };

    FundingDatum::try_new(LABEL, symbol, rate, period_ms).ok()
}

impl PullVenue for HyperliquidVenue {
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
        let rates = payload
            .get("funding_rates")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Parse("missing funding_rates array".into()))?;

        Ok(rates.iter().filter_map(normalize_entry).collect())
    }
}
