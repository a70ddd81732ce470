//! Adapter factory.
//!
//! Builds one adapter per venue from configuration. Every Lighter adapter
//! built here shares a single [`MarketDirectory`].

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::backpack::BackpackVenue;
use crate::adapter::outbound::edgex::EdgexVenue;
use crate::adapter::outbound::hyperliquid::HyperliquidVenue;
use crate::adapter::outbound::lighter::{LighterVenue, MarketDirectory};
use crate::adapter::outbound::paradex::ParadexVenue;
use crate::adapter::outbound::{PullAdapter, PushAdapter, ReqwestFetcher, TungsteniteConnector};
use crate::application::{FundingMonitor, MonitorHandle};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::{ExchangeAdapter, HttpFetcher, WsConnector};

/// HTTP and WebSocket transports shared by all adapters.
#[derive(Clone)]
pub struct Transports {
    pub fetcher: Arc<dyn HttpFetcher>,
    pub connector: Arc<dyn WsConnector>,
}

/// Build the production transports.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_transports() -> Result<Transports> {
    Ok(Transports {
        fetcher: Arc::new(ReqwestFetcher::new()?),
        connector: Arc::new(TungsteniteConnector::new()),
    })
}

/// Build every venue adapter in registration order.
#[must_use]
pub fn build_adapters(config: &Config, transports: &Transports) -> Vec<Arc<dyn ExchangeAdapter>> {
    let venues = &config.venues;
    let delay = config.reconnect_delay();
    let fetcher = &transports.fetcher;
    let connector = &transports.connector;

    let directory = Arc::new(MarketDirectory::new(
        venues.lighter_directory_url(),
        Arc::clone(fetcher),
    ));

    let adapters: Vec<Arc<dyn ExchangeAdapter>> = vec![
        Arc::new(
            PushAdapter::new(
                LighterVenue::new(venues.lighter_url(), directory),
                Arc::clone(connector),
            )
            .with_reconnect_delay(delay),
        ),
        Arc::new(
            PushAdapter::new(EdgexVenue::new(venues.edgex_url()), Arc::clone(connector))
                .with_reconnect_delay(delay),
        ),
        Arc::new(PullAdapter::new(
            BackpackVenue::new(venues.backpack_url()),
            Arc::clone(fetcher),
        )),
        Arc::new(
            PushAdapter::new(ParadexVenue::new(venues.paradex_url()), Arc::clone(connector))
                .with_reconnect_delay(delay),
        ),
        Arc::new(PullAdapter::new(
            HyperliquidVenue::new(venues.hyperliquid_url()),
            Arc::clone(fetcher),
        )),
    ];

    info!(adapters = adapters.len(), "Adapters built");
    adapters
}

/// Build the monitor over every configured adapter.
#[must_use]
pub fn build_monitor(config: &Config, transports: &Transports) -> (FundingMonitor, MonitorHandle) {
    FundingMonitor::new(
        build_adapters(config, transports),
        config.monitor.settings(),
    )
}
