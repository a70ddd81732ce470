//! Market-id → symbol directory shared by every Lighter adapter.
//!
//! The stream identifies markets by numeric id. The directory is loaded from
//! the order book details endpoint at most once at a time: concurrent callers
//! of [`MarketDirectory::ensure_loaded`] wait for the same fetch. A failed
//! load leaves the directory unloaded so a later miss retries.
//!
//! Entries are append-only. Neither a load nor a learned inline symbol ever
//! replaces an id that is already mapped.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::adapter::outbound::parse::field_str;
use crate::error::{Error, Result};
use crate::port::HttpFetcher;

pub const DEFAULT_DIRECTORY_URL: &str =
    "https://mainnet.zklighter.elliot.ai/api/v1/orderBookDetails";

#[derive(Debug, Default)]
struct Entries {
    markets: HashMap<u64, String>,
    loaded: bool,
}

/// Shared Lighter market directory.
pub struct MarketDirectory {
    url: String,
    fetcher: Arc<dyn HttpFetcher>,
    entries: RwLock<Entries>,
    load: AsyncMutex<()>,
}

impl MarketDirectory {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
            entries: RwLock::new(Entries::default()),
            load: AsyncMutex::new(()),
        }
    }

    /// Whether a full directory load has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.entries.read().loaded
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().markets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol for a market id, if known.
    #[must_use]
    pub fn resolve(&self, market_id: u64) -> Option<String> {
        self.entries.read().markets.get(&market_id).cloned()
    }

    /// Record an inline symbol seen on the stream. Existing ids are kept.
    pub fn learn(&self, market_id: u64, symbol: &str) {
        self.entries
            .write()
            .markets
            .entry(market_id)
            .or_insert_with(|| symbol.to_string());
    }

    /// Load the directory unless already loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails or the response has the wrong
    /// shape. The directory stays unloaded in that case.
    pub async fn ensure_loaded(&self) -> Result<()> {
        if self.is_loaded() {
            return Ok(());
        }

        let _guard = self.load.lock().await;
        if self.is_loaded() {
            return Ok(());
        }

        let payload = self.fetcher.get_json(&self.url).await?;
        let fetched = parse_directory(&payload)?;
        let count = fetched.len();

        let mut entries = self.entries.write();
        for (id, symbol) in fetched {
            entries.markets.entry(id).or_insert(symbol);
        }
        entries.loaded = true;
        drop(entries);

        info!(markets = count, "Loaded Lighter market directory");
        Ok(())
    }

    /// Start a background load if none is loaded or in flight.
    ///
    /// Does nothing outside a Tokio runtime.
    pub fn request_load(self: &Arc<Self>) {
        if self.is_loaded() || self.load.try_lock().is_err() {
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            debug!("No runtime available for directory load");
            return;
        };

        let directory = Arc::clone(self);
        handle.spawn(async move {
            if let Err(e) = directory.ensure_loaded().await {
                warn!(error = %e, "Lighter market directory load failed");
            }
        });
    }
}

fn parse_directory(payload: &Value) -> Result<Vec<(u64, String)>> {
    let details = payload
        .get("order_book_details")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Parse("missing order_book_details".into()))?;

    Ok(details
        .iter()
        .filter_map(|entry| {
            let id = entry.get("market_id")?.as_u64()?;
            let symbol = field_str(entry, "symbol")?.to_uppercase();
            Some((id, symbol))
        })
        .collect())
}
