//! Streaming push adapter engine.
//!
//! A [`PushAdapter`] wraps one [`PushVenue`] (URL, subscription frames and
//! message decoding) and keeps a connection to it alive until stopped.
//!
//! # Connection Lifecycle
//!
//! The connection is an explicit state machine; the sink latch is checked
//! before every transition, so a stopped adapter never moves again.
//!
//! ```text
//! Connecting ──ok──▶ Open ──stream ends──▶ Closed ──2s──▶ Connecting ...
//!      └───────err──────────────────────────▲
//! ```
//!
//! - **Connecting**: publishes `Connecting`; a failed connect publishes `Error`
//! - **Open**: publishes `Open`, sends the venue's subscriptions, then reads
//!   frames. Keep-alive probes are answered before the next frame is read.
//!   Undecodable messages are skipped without touching the connection.
//! - **Closed**: publishes `Closed` and waits a fixed delay before retrying.
//!   There is no backoff growth and no retry limit.
//!
//! Readings are kept in a per-run [`FundingBook`] keyed by symbol. Whenever a
//! message changes at least one entry the full book is published.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::domain::{AdapterId, AdapterStatus, FundingDatum};
use crate::error::Result;
use crate::port::{
    AdapterControl, AdapterKind, EventSink, ExchangeAdapter, StartContext, WsConnection,
    WsConnector, WsFrame,
};

/// Delay between a disconnect and the next connection attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Result of decoding one text message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Venue-level keep-alive probe; send this reply immediately.
    Reply(String),
    /// Normalized readings carried by the message.
    Updates(Vec<FundingDatum>),
    /// Acknowledgements and other traffic with no funding data.
    Ignore,
}

/// Exchange-specific half of a push adapter.
pub trait PushVenue: Send + Sync + 'static {
    fn id(&self) -> &AdapterId;

    fn label(&self) -> &'static str;

    /// URL for the next connection attempt.
    fn url(&self) -> String;

    /// Frames sent right after the connection opens.
    fn subscriptions(&self) -> Vec<String>;

    /// Decode one text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is not valid JSON. Such messages are
    /// skipped.
    fn decode(&self, text: &str) -> Result<Decoded>;

    /// Hook run once when the adapter starts.
    fn on_start(&self) {}

    /// Whether an `Ok` status follows each data emission.
    fn reports_ok_on_data(&self) -> bool {
        false
    }
}

/// Latest reading per symbol for one adapter run.
#[derive(Debug, Default)]
pub struct FundingBook {
    entries: BTreeMap<String, FundingDatum>,
}

impl FundingBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge readings; returns `true` if any entry was added or changed value.
    pub fn apply(&mut self, updates: Vec<FundingDatum>) -> bool {
        let mut changed = false;
        for datum in updates {
            let is_new = self
                .entries
                .get(datum.symbol())
                .map_or(true, |prev| prev.differs_from(&datum));
            if is_new {
                self.entries.insert(datum.symbol().to_string(), datum);
                changed = true;
            }
        }
        changed
    }

    /// All current readings.
    #[must_use]
    pub fn snapshot(&self) -> Vec<FundingDatum> {
        self.entries.values().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Push adapter for any [`PushVenue`].
pub struct PushAdapter<V> {
    venue: Arc<V>,
    connector: Arc<dyn WsConnector>,
    reconnect_delay: Duration,
}

impl<V: PushVenue> PushAdapter<V> {
    pub fn new(venue: V, connector: Arc<dyn WsConnector>) -> Self {
        Self {
            venue: Arc::new(venue),
            connector,
            reconnect_delay: RECONNECT_DELAY,
        }
    }

    /// Override the fixed reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl<V: PushVenue> ExchangeAdapter for PushAdapter<V> {
    fn id(&self) -> &AdapterId {
        self.venue.id()
    }

    fn label(&self) -> &'static str {
        self.venue.label()
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Push
    }

    fn start(&self, ctx: StartContext) -> Arc<dyn AdapterControl> {
        self.venue.on_start();

        let worker = PushWorker {
            venue: Arc::clone(&self.venue),
            connector: Arc::clone(&self.connector),
            sink: ctx.sink.clone(),
            reconnect_delay: self.reconnect_delay,
            book: FundingBook::new(),
        };
        let task = tokio::spawn(worker.run());

        Arc::new(PushControl {
            sink: ctx.sink,
            task: Mutex::new(Some(task)),
        })
    }
}

enum ConnectionState {
    Connecting,
    Open(Box<dyn WsConnection>),
    Closed,
}

struct PushWorker<V> {
    venue: Arc<V>,
    connector: Arc<dyn WsConnector>,
    sink: EventSink,
    reconnect_delay: Duration,
    book: FundingBook,
}

impl<V: PushVenue> PushWorker<V> {
    async fn run(mut self) {
        let mut state = ConnectionState::Connecting;
        while self.sink.is_active() {
            state = match state {
                ConnectionState::Connecting => self.connect().await,
                ConnectionState::Open(mut conn) => {
                    self.stream(conn.as_mut()).await;
                    conn.close().await;
                    ConnectionState::Closed
                }
                ConnectionState::Closed => {
                    self.sink.status(AdapterStatus::Closed);
                    if !self.sink.is_active() {
                        break;
                    }
                    debug!(
                        adapter = %self.venue.id(),
                        delay_ms = self.reconnect_delay.as_millis(),
                        "Reconnecting after delay"
                    );
                    tokio::time::sleep(self.reconnect_delay).await;
                    ConnectionState::Connecting
                }
            };
        }
        debug!(adapter = %self.venue.id(), "Push adapter stopped");
    }

    async fn connect(&mut self) -> ConnectionState {
        self.sink.status(AdapterStatus::Connecting);

        let mut conn = match self.connector.connect(&self.venue.url()).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(adapter = %self.venue.id(), error = %e, "Connection failed");
                self.sink.status(AdapterStatus::Error);
                return ConnectionState::Closed;
            }
        };

        if !self.sink.is_active() {
            conn.close().await;
            return ConnectionState::Closed;
        }

        self.sink.status(AdapterStatus::Open);
        for frame in self.venue.subscriptions() {
            if let Err(e) = conn.send_text(frame).await {
                warn!(adapter = %self.venue.id(), error = %e, "Subscribe failed");
                self.sink.status(AdapterStatus::Error);
                conn.close().await;
                return ConnectionState::Closed;
            }
        }
        info!(adapter = %self.venue.id(), "Subscribed to funding channel");

        ConnectionState::Open(conn)
    }

    async fn stream(&mut self, conn: &mut dyn WsConnection) {
        while let Some(frame) = conn.next_frame().await {
            if !self.sink.is_active() {
                return;
            }

            match frame {
                Ok(WsFrame::Text(text)) => {
                    if !self.handle_text(conn, &text).await {
                        return;
                    }
                }
                Ok(WsFrame::Ping(payload)) => {
                    trace!(adapter = %self.venue.id(), "Received WebSocket ping");
                    if let Err(e) = conn.send_pong(payload).await {
                        warn!(adapter = %self.venue.id(), error = %e, "Failed to send pong");
                        self.sink.status(AdapterStatus::Error);
                        return;
                    }
                }
                Ok(WsFrame::Close(reason)) => {
                    info!(
                        adapter = %self.venue.id(),
                        reason = ?reason,
                        "WebSocket closed by server"
                    );
                    return;
                }
                Ok(WsFrame::Other) => {}
                Err(e) => {
                    warn!(adapter = %self.venue.id(), error = %e, "WebSocket error");
                    self.sink.status(AdapterStatus::Error);
                    return;
                }
            }
        }
        info!(adapter = %self.venue.id(), "WebSocket stream ended");
    }

    /// Returns `false` when the connection should be dropped.
    async fn handle_text(&mut self, conn: &mut dyn WsConnection, text: &str) -> bool {
        match self.venue.decode(text) {
            Ok(Decoded::Reply(reply)) => {
                trace!(adapter = %self.venue.id(), "Answering keep-alive");
                if let Err(e) = conn.send_text(reply).await {
                    warn!(adapter = %self.venue.id(), error = %e, "Failed to answer keep-alive");
                    self.sink.status(AdapterStatus::Error);
                    return false;
                }
            }
            Ok(Decoded::Updates(updates)) => {
                if self.book.apply(updates) {
                    self.sink.data(self.book.snapshot());
                    if self.venue.reports_ok_on_data() {
                        self.sink.status(AdapterStatus::Ok);
                    }
                }
            }
            Ok(Decoded::Ignore) => {}
            Err(e) => {
                debug!(
                    adapter = %self.venue.id(),
                    error = %e,
                    bytes = text.len(),
                    "Skipping malformed message"
                );
            }
        }
        true
    }
}

struct PushControl {
    sink: EventSink,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AdapterControl for PushControl {
    fn stop(&self) {
        self.sink.close();
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::edgex::EdgexVenue;
    use crate::adapter::outbound::lighter::{LighterVenue, MarketDirectory};
    use crate::port::{AdapterEvent, AdapterPayload, HttpFetcher};
    use crate::testkit::domain::{drain, sink};
    use crate::testkit::http::StubFetcher;
    use crate::testkit::ws::{ConnectScript, ScriptedConnector, Sent};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn quote(contract: &str, rate: &str) -> WsFrame {
        WsFrame::Text(
            json!({
                "type": "quote-event",
                "content": { "data": [{
                    "contractName": contract,
                    "fundingRate": rate,
                    "fundingTime": "1700000000000",
                    "nextFundingTime": "1700014400000",
                }]},
            })
            .to_string(),
        )
    }

    fn start_edgex(
        connector: &ScriptedConnector,
    ) -> (Arc<dyn AdapterControl>, UnboundedReceiver<AdapterEvent>) {
        let adapter = PushAdapter::new(EdgexVenue::default(), Arc::new(connector.clone()));
        let (sink, rx) = sink("edgex", 1);
        (adapter.start(StartContext { sink, interval_secs: 0 }), rx)
    }

    async fn next(rx: &mut UnboundedReceiver<AdapterEvent>) -> AdapterPayload {
        rx.recv().await.expect("sink open").payload
    }

    fn status(status: AdapterStatus) -> AdapterPayload {
        AdapterPayload::Status(status)
    }

    async fn wait_for_sent(connector: &ScriptedConnector, n: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while connector.sent().len() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("frames sent in time");
    }

    #[tokio::test]
    async fn subscribes_and_publishes_only_changes() {
        let connector = ScriptedConnector::new(vec![ConnectScript::held(vec![
            quote("BTCUSD", "0.0001"),
            quote("BTCUSD", "0.0001"),
            WsFrame::Text("not json".into()),
            quote("ETHUSD", "0.0002"),
        ])]);
        let (control, mut rx) = start_edgex(&connector);

        assert_eq!(next(&mut rx).await, status(AdapterStatus::Connecting));
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Open));

        let AdapterPayload::Data(first) = next(&mut rx).await else {
            panic!("expected data");
        };
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].symbol(), "BTC");
        assert_eq!(first[0].period_ms(), 4 * 3_600_000);

        let AdapterPayload::Data(second) = next(&mut rx).await else {
            panic!("expected data");
        };
        let symbols: Vec<&str> = second.iter().map(FundingDatum::symbol).collect();
        assert_eq!(symbols, vec!["BTC", "ETH"]);

        assert!(connector.urls()[0].contains("?timestamp="));
        assert_eq!(
            connector.sent_text(),
            vec![r#"{"channel":"ticker.all.1s","type":"subscribe"}"#.to_string()]
        );

        control.stop();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn stop_during_connect_is_silent() {
        let (connector, gate) =
            ScriptedConnector::new(vec![ConnectScript::held(vec![quote("BTCUSD", "0.0001")])])
                .gated();
        let (control, mut rx) = start_edgex(&connector);

        assert_eq!(next(&mut rx).await, status(AdapterStatus::Connecting));
        tokio::time::timeout(Duration::from_secs(1), async {
            while connector.connect_count() < 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("connect attempted in time");

        control.stop();
        gate.release(1);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(drain(&mut rx).is_empty());
        assert!(connector.sent().is_empty());
        assert_eq!(connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn pings_are_answered_in_order() {
        let connector = ScriptedConnector::new(vec![ConnectScript::held(vec![
            WsFrame::Ping(vec![1, 2]),
            WsFrame::Text(r#"{"type":"ping","time":"5"}"#.into()),
        ])]);
        let (control, _rx) = start_edgex(&connector);

        wait_for_sent(&connector, 3).await;
        let sent = connector.sent();
        assert_eq!(sent[1], Sent::Pong(vec![1, 2]));
        assert_eq!(sent[2], Sent::Text(r#"{"time":"5","type":"pong"}"#.into()));
        control.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn reconnects_once_per_fixed_delay() {
        let connector = ScriptedConnector::new(vec![
            ConnectScript::frames(Vec::new()),
            ConnectScript::frames(Vec::new()),
        ]);
        let (control, mut rx) = start_edgex(&connector);

        assert_eq!(next(&mut rx).await, status(AdapterStatus::Connecting));
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Open));
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Closed));
        let closed_at = tokio::time::Instant::now();

        assert_eq!(next(&mut rx).await, status(AdapterStatus::Connecting));
        assert_eq!(closed_at.elapsed(), RECONNECT_DELAY);
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Open));
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Closed));

        control.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(connector.connect_count(), 2);
        assert_eq!(connector.close_count(), 2);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_connect_is_retried() {
        let connector =
            ScriptedConnector::new(vec![ConnectScript::Fail, ConnectScript::held(Vec::new())]);
        let (control, mut rx) = start_edgex(&connector);

        for expected in [
            AdapterStatus::Connecting,
            AdapterStatus::Error,
            AdapterStatus::Closed,
            AdapterStatus::Connecting,
            AdapterStatus::Open,
        ] {
            assert_eq!(next(&mut rx).await, status(expected));
        }
        assert_eq!(connector.connect_count(), 2);
        control.stop();
    }

    #[tokio::test]
    async fn lighter_reports_ok_after_each_change() {
        let fetcher: Arc<dyn HttpFetcher> = Arc::new(
            StubFetcher::new().with_fallback(json!({ "order_book_details": [] })),
        );
        let directory = Arc::new(MarketDirectory::new("http://directory", fetcher));
        let stats = json!({
            "type": "update/market_stats",
            "market_stats": { "1": { "market_id": 1, "symbol": "btc", "funding_rate": "0.01" } },
        });
        let connector = ScriptedConnector::new(vec![ConnectScript::held(vec![
            WsFrame::Text(stats.to_string()),
            WsFrame::Text(stats.to_string()),
            WsFrame::Text(r#"{"type":"ping"}"#.into()),
        ])]);
        let adapter = PushAdapter::new(
            LighterVenue::new("ws://lighter", directory),
            Arc::new(connector.clone()),
        );
        let (sink, mut rx) = sink("lighter", 1);
        let control = adapter.start(StartContext { sink, interval_secs: 0 });

        assert_eq!(next(&mut rx).await, status(AdapterStatus::Connecting));
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Open));
        let AdapterPayload::Data(list) = next(&mut rx).await else {
            panic!("expected data");
        };
        assert_eq!(list[0].symbol(), "BTC");
        assert!((list[0].raw_rate() - 0.0001).abs() < 1e-15);
        assert_eq!(next(&mut rx).await, status(AdapterStatus::Ok));

        wait_for_sent(&connector, 2).await;
        assert_eq!(connector.sent_text()[1], r#"{"type":"pong"}"#);
        assert!(drain(&mut rx).is_empty());
        control.stop();
    }

    fn datum(symbol: &str, rate: f64) -> FundingDatum {
        FundingDatum::try_new("EdgeX", symbol, rate, 3_600_000).unwrap()
    }

    #[test]
    fn book_reports_change_only_on_value_difference() {
        let mut book = FundingBook::new();
        assert!(book.apply(vec![datum("BTC", 0.01), datum("ETH", 0.02)]));
        assert!(!book.apply(vec![datum("BTC", 0.01)]));
        assert!(book.apply(vec![datum("BTC", 0.011)]));
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn book_snapshot_holds_latest_values() {
        let mut book = FundingBook::new();
        book.apply(vec![datum("BTC", 0.01)]);
        book.apply(vec![datum("BTC", 0.03), datum("SOL", -0.01)]);

        let snapshot = book.snapshot();
        assert_eq!(snapshot.len(), 2);
        let btc = snapshot.iter().find(|d| d.symbol() == "BTC").unwrap();
        assert_eq!(btc.raw_rate(), 0.03);
    }

    #[test]
    fn empty_update_is_not_a_change() {
        let mut book = FundingBook::new();
        assert!(!book.apply(Vec::new()));
        assert!(book.is_empty());
    }
}
