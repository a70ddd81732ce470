//! Timer-driven pull adapter engine.
//!
//! A [`PullAdapter`] wraps one [`PullVenue`] (endpoint + normalization rules)
//! and drives it on a schedule:
//!
//! 1. **Start**: one fetch is issued immediately
//! 2. **Poll**: further fetches run every `interval_secs` (`0` disables)
//! 3. **Fetch**: the whole response is normalized into a fresh list, then
//!    published as `Data` followed by `Ok`
//! 4. **Failure**: only `Error` is published, so the last good snapshot stays
//!    in place downstream
//!
//! Fetches that resolve after [`AdapterControl::stop`] publish nothing; the
//! sink is latched shut before any timer is cancelled.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::{AdapterId, AdapterStatus, FundingDatum};
use crate::error::Result;
use crate::port::{
    AdapterControl, AdapterKind, EventSink, ExchangeAdapter, HttpFetcher, StartContext,
};

/// Exchange-specific half of a pull adapter.
pub trait PullVenue: Send + Sync + 'static {
    fn id(&self) -> &AdapterId;

    fn label(&self) -> &'static str;

    /// Endpoint returning the venue's funding snapshot.
    fn url(&self) -> &str;

    /// Build the entire normalized list from one response.
    ///
    /// Individual unusable entries are skipped; a response whose overall
    /// shape is wrong is an error.
    fn normalize(&self, payload: &Value) -> Result<Vec<FundingDatum>>;
}

/// Pull adapter for any [`PullVenue`].
pub struct PullAdapter<V> {
    venue: Arc<V>,
    fetcher: Arc<dyn HttpFetcher>,
}

impl<V: PullVenue> PullAdapter<V> {
    pub fn new(venue: V, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            venue: Arc::new(venue),
            fetcher,
        }
    }
}

impl<V: PullVenue> ExchangeAdapter for PullAdapter<V> {
    fn id(&self) -> &AdapterId {
        self.venue.id()
    }

    fn label(&self) -> &'static str {
        self.venue.label()
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Pull
    }

    fn start(&self, ctx: StartContext) -> Arc<dyn AdapterControl> {
        let worker = Arc::new(PullWorker {
            venue: Arc::clone(&self.venue),
            fetcher: Arc::clone(&self.fetcher),
            sink: ctx.sink,
        });

        let initial = {
            let worker = Arc::clone(&worker);
            tokio::spawn(async move { worker.fetch_once().await })
        };

        let control = PullControl {
            worker,
            initial: Mutex::new(Some(initial)),
            timer: Mutex::new(None),
        };
        control.set_interval_secs(ctx.interval_secs);
        Arc::new(control)
    }
}

struct PullWorker<V> {
    venue: Arc<V>,
    fetcher: Arc<dyn HttpFetcher>,
    sink: EventSink,
}

impl<V: PullVenue> PullWorker<V> {
    async fn fetch_once(&self) {
        let result = self
            .fetcher
            .get_json(self.venue.url())
            .await
            .and_then(|payload| self.venue.normalize(&payload));

        if !self.sink.is_active() {
            return;
        }

        match result {
            Ok(list) => {
                debug!(adapter = %self.venue.id(), count = list.len(), "Fetched funding rates");
                self.sink.data(list);
                self.sink.status(AdapterStatus::Ok);
            }
            Err(e) => {
                warn!(adapter = %self.venue.id(), error = %e, "Funding fetch failed");
                self.sink.status(AdapterStatus::Error);
            }
        }
    }
}

struct PullControl<V> {
    worker: Arc<PullWorker<V>>,
    initial: Mutex<Option<JoinHandle<()>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

#[async_trait]
impl<V: PullVenue> AdapterControl for PullControl<V> {
    fn stop(&self) {
        self.worker.sink.close();
        if let Some(handle) = self.timer.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.initial.lock().take() {
            handle.abort();
        }
    }

    fn set_interval_secs(&self, secs: u64) {
        let mut timer = self.timer.lock();
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        if secs == 0 || !self.worker.sink.is_active() {
            return;
        }

        let period = Duration::from_secs(secs);
        let Some(first_tick) = Instant::now().checked_add(period) else {
            warn!(
                adapter = %self.worker.venue.id(),
                interval_secs = secs,
                "Refresh interval out of range, polling disabled"
            );
            return;
        };
        let worker = Arc::clone(&self.worker);
        *timer = Some(tokio::spawn(async move {
            let mut ticks = interval_at(first_tick, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                worker.fetch_once().await;
            }
        }));
    }

    async fn manual_refresh(&self) {
        if self.worker.sink.is_active() {
            self.worker.fetch_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::backpack::BackpackVenue;
    use crate::error::Error;
    use crate::port::AdapterPayload;
    use crate::testkit::domain::{drain, sink, statuses};
    use crate::testkit::http::StubFetcher;
    use serde_json::json;

    fn marks() -> Value {
        json!([
            { "symbol": "BTC_USDC_PERP", "fundingRate": "0.0001" },
            { "symbol": "ETH_USDC_PERP", "fundingRate": "-0.0002" },
        ])
    }

    fn start(
        fetcher: &Arc<StubFetcher>,
        interval_secs: u64,
    ) -> (
        Arc<dyn AdapterControl>,
        tokio::sync::mpsc::UnboundedReceiver<crate::port::AdapterEvent>,
    ) {
        let adapter = PullAdapter::new(
            BackpackVenue::default(),
            Arc::clone(fetcher) as Arc<dyn HttpFetcher>,
        );
        let (sink, rx) = sink("backpack", 1);
        (adapter.start(StartContext { sink, interval_secs }), rx)
    }

    #[tokio::test]
    async fn initial_fetch_publishes_data_then_ok() {
        let fetcher = Arc::new(StubFetcher::new().with_response(Ok(marks())));
        let (control, mut rx) = start(&fetcher, 0);

        let first = rx.recv().await.unwrap().payload;
        let AdapterPayload::Data(list) = first else {
            panic!("expected data first, got {first:?}");
        };
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].symbol(), "BTC");
        assert_eq!(
            rx.recv().await.unwrap().payload,
            AdapterPayload::Status(AdapterStatus::Ok)
        );
        control.stop();
    }

    #[tokio::test]
    async fn failure_reports_error_without_data() {
        let fetcher = Arc::new(
            StubFetcher::new()
                .with_response(Err(Error::Connection("refused".into())))
                .with_response(Ok(json!({ "unexpected": true }))),
        );
        let (control, mut rx) = start(&fetcher, 0);

        assert_eq!(
            rx.recv().await.unwrap().payload,
            AdapterPayload::Status(AdapterStatus::Error)
        );

        control.manual_refresh().await;
        assert_eq!(statuses(&drain(&mut rx)), vec![AdapterStatus::Error]);
        control.stop();
    }

    #[tokio::test]
    async fn fetch_resolving_after_stop_is_silent() {
        let (stub, gate) = StubFetcher::new().with_fallback(marks()).gated();
        let fetcher = Arc::new(stub);
        let (control, mut rx) = start(&fetcher, 0);

        gate.release(1);
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        let refresh = {
            let control = Arc::clone(&control);
            tokio::spawn(async move { control.manual_refresh().await })
        };
        while fetcher.calls() < 2 {
            tokio::task::yield_now().await;
        }

        control.stop();
        gate.release(1);
        refresh.await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_drives_polling() {
        let fetcher = Arc::new(StubFetcher::new().with_fallback(marks()));
        let (control, _rx) = start(&fetcher, 10);

        tokio::time::sleep(Duration::from_secs(35)).await;
        assert_eq!(fetcher.calls(), 4);

        control.set_interval_secs(0);
        tokio::time::sleep(Duration::from_secs(100)).await;
        assert_eq!(fetcher.calls(), 4);

        control.set_interval_secs(60);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(fetcher.calls(), 5);

        control.stop();
        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(fetcher.calls(), 5);
    }

    #[tokio::test]
    async fn out_of_range_interval_disables_polling() {
        let fetcher = Arc::new(StubFetcher::new().with_fallback(marks()));
        let (sink, _rx) = sink("backpack", 1);
        let control = PullControl {
            worker: Arc::new(PullWorker {
                venue: Arc::new(BackpackVenue::default()),
                fetcher: Arc::clone(&fetcher) as Arc<dyn HttpFetcher>,
                sink,
            }),
            initial: Mutex::new(None),
            timer: Mutex::new(None),
        };

        control.set_interval_secs(10);
        assert!(control.timer.lock().is_some());

        control.set_interval_secs(u64::MAX);
        assert!(control.timer.lock().is_none());

        control.set_interval_secs(30);
        assert!(control.timer.lock().is_some());
        control.stop();
        assert!(control.timer.lock().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_interval_keeps_initial_snapshot() {
        let fetcher = Arc::new(StubFetcher::new().with_fallback(marks()));
        let (control, mut rx) = start(&fetcher, u64::MAX);
        rx.recv().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap().payload,
            AdapterPayload::Status(AdapterStatus::Ok)
        );

        tokio::time::sleep(Duration::from_secs(3_600)).await;
        assert_eq!(fetcher.calls(), 1);

        control.set_interval_secs(10);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(fetcher.calls(), 2);
        control.stop();
    }

    #[tokio::test]
    async fn manual_refresh_fetches_once() {
        let fetcher = Arc::new(StubFetcher::new().with_fallback(marks()));
        let (control, mut rx) = start(&fetcher, 0);
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        control.manual_refresh().await;
        let payloads = drain(&mut rx);
        assert_eq!(payloads.len(), 2);
        assert_eq!(statuses(&payloads), vec![AdapterStatus::Ok]);
        assert_eq!(fetcher.calls(), 2);

        control.stop();
        control.manual_refresh().await;
        assert_eq!(fetcher.calls(), 2);
    }
}
