//! Tests for factory functions.

use std::sync::Arc;

use crate::adapter::outbound::ADAPTER_IDS;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::{build_adapters, Transports};
use crate::port::{AdapterKind, StartContext};
use crate::testkit::domain::sink;
use crate::testkit::http::StubFetcher;
use crate::testkit::ws::{ConnectScript, ScriptedConnector};

fn transports(fetcher: Arc<StubFetcher>, connector: ScriptedConnector) -> Transports {
    Transports {
        fetcher,
        connector: Arc::new(connector),
    }
}

#[test]
fn builds_every_venue_in_order() {
    let config = Config::default();
    let adapters = build_adapters(
        &config,
        &transports(Arc::new(StubFetcher::new()), ScriptedConnector::new(Vec::new())),
    );

    let ids: Vec<&str> = adapters.iter().map(|a| a.id().as_str()).collect();
    assert_eq!(ids, ADAPTER_IDS);

    let kinds: Vec<AdapterKind> = adapters.iter().map(|a| a.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            AdapterKind::Push,
            AdapterKind::Push,
            AdapterKind::Pull,
            AdapterKind::Push,
            AdapterKind::Pull,
        ]
    );
    let labels: Vec<&str> = adapters.iter().map(|a| a.label()).collect();
    assert_eq!(labels, vec!["Lighter", "EdgeX", "Backpack", "ParaDex", "Hyperliquid"]);
}

#[tokio::test]
async fn configured_urls_reach_adapters() {
    let config = Config::parse_toml(
        r#"
        [venues.backpack]
        url = "http://proxy.local/backpack"

        [venues.lighter]
        url = "ws://proxy.local/lighter"
        directory_url = "http://proxy.local/lighter/details"
        "#,
    )
    .unwrap();
    let fetcher = Arc::new(StubFetcher::new());
    let connector = ScriptedConnector::new(vec![ConnectScript::held(Vec::new())]);
    let adapters = build_adapters(&config, &transports(fetcher.clone(), connector.clone()));

    let lighter = &adapters[0];
    let backpack = &adapters[2];

    let (lighter_sink, _lighter_rx) = sink("lighter", 1);
    let lighter_control = lighter.start(StartContext {
        sink: lighter_sink,
        interval_secs: 0,
    });
    let (backpack_sink, _backpack_rx) = sink("backpack", 1);
    let backpack_control = backpack.start(StartContext {
        sink: backpack_sink,
        interval_secs: 0,
    });

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    lighter_control.stop();
    backpack_control.stop();

    let urls = fetcher.urls();
    assert!(urls.contains(&"http://proxy.local/lighter/details".to_string()));
    assert!(urls.contains(&"http://proxy.local/backpack".to_string()));
    assert_eq!(connector.urls(), vec!["ws://proxy.local/lighter".to_string()]);
}
