//! Lighter: market statistics stream keyed by numeric market id.
//!
//! Funding is reported as a percentage per one-hour period. Market ids are
//! resolved through the shared [`MarketDirectory`]; an id the directory does
//! not know is mapped from the entry's inline symbol when one is present.

mod directory;

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::parse::{field_number, field_str};
use super::push::{Decoded, PushVenue};
use crate::domain::{AdapterId, FundingDatum, HOUR_MS};
use crate::error::Result;

pub use directory::{MarketDirectory, DEFAULT_DIRECTORY_URL};

pub const ID: &str = "lighter";
pub const LABEL: &str = "Lighter";
pub const DEFAULT_URL: &str = "wss://mainnet.zklighter.elliot.ai/stream";

const STATS_CHANNEL: &str = "market_stats:all";

/// Lighter public stream.
pub struct LighterVenue {
    id: AdapterId,
    url: String,
    directory: Arc<MarketDirectory>,
}

impl LighterVenue {
    pub fn new(url: impl Into<String>, directory: Arc<MarketDirectory>) -> Self {
        Self {
            id: AdapterId::new(ID),
            url: url.into(),
            directory,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Arc<MarketDirectory> {
        &self.directory
    }

    fn symbol_for(&self, market_id: u64, entry: &Value) -> Option<String> {
        if let Some(symbol) = self.directory.resolve(market_id) {
            return Some(symbol);
        }
        match field_str(entry, "symbol") {
            Some(inline) => {
                let symbol = inline.to_uppercase();
                self.directory.learn(market_id, &symbol);
                Some(symbol)
            }
            None => {
                self.directory.request_load();
                None
            }
        }
    }

    fn normalize_stats(&self, stats: &Map<String, Value>) -> Vec<FundingDatum> {
        stats
            .iter()
            .filter(|(_, entry)| entry.is_object())
            .filter_map(|(key, entry)| {
                let market_id = entry
                    .get("market_id")
                    .and_then(Value::as_u64)
                    .or_else(|| key.parse().ok())?;
                let symbol = self.symbol_for(market_id, entry)?;
                let percent = field_number(entry, "funding_rate")
                    .or_else(|| field_number(entry, "current_funding_rate"))?;
                FundingDatum::try_new(LABEL, symbol, percent / 100.0, HOUR_MS as i64).ok()
            })
            .collect()
    }
}

fn market_stats(message: &Value) -> Option<&Map<String, Value>> {
    let stats = message.get("market_stats")?.as_object();
    match message.get("type").and_then(Value::as_str) {
        Some("subscribed/market_stats" | "update/market_stats") => stats,
        _ if message.get("channel").and_then(Value::as_str) == Some(STATS_CHANNEL) => stats,
        _ => None,
    }
}

impl PushVenue for LighterVenue {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![json!({ "type": "subscribe", "channel": "market_stats/all" }).to_string()]
    }

    fn decode(&self, text: &str) -> Result<Decoded> {
        let message: Value = serde_json::from_str(text)?;
        if message.get("type").and_then(Value::as_str) == Some("ping") {
            return Ok(Decoded::Reply(json!({ "type": "pong" }).to_string()));
        }
        Ok(match market_stats(&message) {
            Some(stats) => Decoded::Updates(self.normalize_stats(stats)),
            None => Decoded::Ignore,
        })
    }

    fn on_start(&self) {
        self.directory.request_load();
    }

    fn reports_ok_on_data(&self) -> bool {
        true
    }
}
