//! ParaDex: JSON-RPC funding-data stream.

use serde::Deserialize;
use serde_json::{json, Value};

use super::parse::field_number;
use super::push::{Decoded, PushVenue};
use crate::domain::{AdapterId, FundingDatum, HOUR_MS};
use crate::error::Result;

pub const ID: &str = "paradex";
pub const LABEL: &str = "ParaDex";
pub const DEFAULT_URL: &str = "wss://ws.api.prod.paradex.trade/v1";

const FUNDING_CHANNEL: &str = "funding_data.ALL";
const QUOTE_SUFFIXES: [&str; 3] = ["USDT", "USDC", "USD"];

#[derive(Debug, Deserialize)]
struct RpcMessage {
    method: Option<String>,
    #[serde(default)]
    id: Value,
    params: Option<RpcParams>,
}

#[derive(Debug, Deserialize)]
struct RpcParams {
    channel: Option<String>,
    data: Option<Value>,
}

/// ParaDex public WebSocket API.
#[derive(Debug, Clone)]
pub struct ParadexVenue {
    id: AdapterId,
    url: String,
}

impl ParadexVenue {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: AdapterId::new(ID),
            url: url.into(),
        }
    }
}

impl Default for ParadexVenue {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// `BTC-USD-PERP` → `BTC`. Markets that are not perpetuals yield `None`.
#[must_use]
pub fn normalize_symbol(market: &str) -> Option<String> {
    let upper = market.to_uppercase();
    let base = upper.strip_suffix("PERP")?;
    let base = base.strip_suffix('-').unwrap_or(base);

    let first = base.split('-').find(|part| !part.is_empty())?;
    let symbol = QUOTE_SUFFIXES
        .iter()
        .find_map(|suffix| first.strip_suffix(suffix))
        .unwrap_or(first);

    (!symbol.is_empty()).then(|| symbol.to_string())
}

/// Rate and period in hours: a direct rate with its period (1h when absent),
/// otherwise the eight-hour rate.
fn rate_and_period(data: &Value) -> Option<(f64, f64)> {
    if let Some(rate) = field_number(data, "funding_rate") {
        let hours = field_number(data, "funding_period_hours")
            .filter(|h| *h > 0.0)
            .unwrap_or(1.0);
        return Some((rate, hours));
    }
    field_number(data, "funding_rate_8h").map(|rate| (rate, 8.0))
}

fn normalize_funding(data: &Value) -> Option<FundingDatum> {
    let symbol = normalize_symbol(data.get("market")?.as_str()?)?;
    let (rate, hours) = rate_and_period(data)?;
    let period_ms = (hours * HOUR_MS as f64).round() as i64;
    FundingDatum::try_new(LABEL, symbol, rate, period_ms).ok()
}

impl PushVenue for ParadexVenue {
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
        vec![json!({
            "jsonrpc": "2.0",
            "method": "subscribe",
            "params": { "channel": FUNDING_CHANNEL },
            "id": 1,
        })
        .to_string()]
    }

    fn decode(&self, text: &str) -> Result<Decoded> {
        let message: RpcMessage = serde_json::from_str(text)?;
        Ok(match message.method.as_deref() {
            Some("ping") => Decoded::Reply(
                json!({ "jsonrpc": "2.0", "id": message.id, "result": "pong" }).to_string(),
            ),
            Some("subscription") => {
                let datum = message
                    .params
                    .filter(|p| p.channel.as_deref() == Some(FUNDING_CHANNEL))
                    .and_then(|p| p.data)
                    .and_then(|data| normalize_funding(&data));
                match datum {
                    Some(datum) => Decoded::Updates(vec![datum]),
                    None => Decoded::Ignore,
                }
            }
            _ => Decoded::Ignore,
        })
    }
}
