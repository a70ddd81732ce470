//! Outbound adapters (driven side): transports, the pull and push engines,
//! and one module per venue.

pub mod backpack;
pub mod edgex;
pub mod http;
pub mod hyperliquid;
pub mod lighter;
pub mod paradex;
pub mod parse;
pub mod pull;
pub mod push;
pub mod websocket;

pub use http::ReqwestFetcher;
pub use pull::{PullAdapter, PullVenue};
pub use push::{Decoded, FundingBook, PushAdapter, PushVenue, RECONNECT_DELAY};
pub use websocket::TungsteniteConnector;

/// Every venue id, in registration order.
pub const ADAPTER_IDS: [&str; 5] = [
    lighter::ID,
    edgex::ID,
    backpack::ID,
    paradex::ID,
    hyperliquid::ID,
];

/// Venues enabled when no selection is configured.
pub const DEFAULT_ENABLED: [&str; 4] = [lighter::ID, edgex::ID, backpack::ID, paradex::ID];

/// Trading page for `symbol` on the venue with display label `exchange`.
///
/// Returns `None` for venues without a known page.
#[must_use]
pub fn trade_url(exchange: &str, symbol: &str) -> Option<String> {
    let symbol = symbol.to_uppercase();
    match exchange {
        edgex::LABEL => Some(format!("https://pro.edgex.exchange/trade/{symbol}USD")),
        lighter::LABEL => Some(format!("https://app.lighter.xyz/trade/{symbol}")),
        backpack::LABEL => Some(format!("https://backpack.exchange/trade/{symbol}_USD_PERP")),
        paradex::LABEL => Some(format!("https://app.paradex.trade/trade/{symbol}-USD-PERP")),
        _ => None,
    }
}
