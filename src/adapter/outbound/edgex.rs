//! EdgeX: all-symbol ticker stream with per-message funding windows.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::parse::number;
use super::push::{Decoded, PushVenue};
use crate::domain::{AdapterId, FundingDatum};
use crate::error::Result;

pub const ID: &str = "edgex";
pub const LABEL: &str = "EdgeX";
pub const DEFAULT_URL: &str = "wss://quote.edgex.exchange/api/v1/public/ws";

const TICKER_CHANNEL: &str = "ticker.all.1s";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    time: Option<Value>,
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    data: Vec<Value>,
}

/// EdgeX public quote stream.
#[derive(Debug, Clone)]
pub struct EdgexVenue {
    id: AdapterId,
    url: String,
}

impl EdgexVenue {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: AdapterId::new(ID),
            url: url.into(),
        }
    }
}

impl Default for EdgexVenue {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// `BTCUSD` → `BTC`.
#[must_use]
pub fn normalize_symbol(contract: &str) -> Option<String> {
    let upper = contract.to_uppercase();
    let base = upper.strip_suffix("USD").unwrap_or(&upper);
    (!base.is_empty()).then(|| base.to_string())
}

fn normalize_ticker(item: &Value) -> Option<FundingDatum> {
    let symbol = normalize_symbol(item.get("contractName")?.as_str()?)?;
    let rate = number(item.get("fundingRate")?)?;
    let funding_time = number(item.get("fundingTime")?)?;
    let next_funding_time = number(item.get("nextFundingTime")?)?;
    let period_ms = (next_funding_time - funding_time).round() as i64;

    FundingDatum::try_new(LABEL, symbol, rate, period_ms).ok()
}

fn pong(time: Option<&Value>) -> String {
    let time = match time {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => Utc::now().timestamp_millis().to_string(),
    };
    json!({ "type": "pong", "time": time }).to_string()
}

impl PushVenue for EdgexVenue {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    fn url(&self) -> String {
        format!("{}?timestamp={}", self.url, Utc::now().timestamp_millis())
    }

    fn subscriptions(&self) -> Vec<String> {
        vec![json!({ "type": "subscribe", "channel": TICKER_CHANNEL }).to_string()]
    }

    fn decode(&self, text: &str) -> Result<Decoded> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Ok(match envelope.kind.as_deref() {
            Some("ping") => Decoded::Reply(pong(envelope.time.as_ref())),
            Some("quote-event") => match envelope.content {
                Some(content) => {
                    Decoded::Updates(content.data.iter().filter_map(normalize_ticker).collect())
                }
                None => Decoded::Ignore,
            },
            _ => Decoded::Ignore,
        })
    }
}
