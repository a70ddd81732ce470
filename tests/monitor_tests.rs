//! Registry and monitor behavior through the public handle.

use std::sync::Arc;
use std::time::Duration;

use fundarb::application::{DashboardView, FundingMonitor, MonitorHandle};
use fundarb::domain::{AdapterId, AdapterStatus, RankingPolicy};
use fundarb::error::Error;
use fundarb::port::ExchangeAdapter;
use fundarb::testkit::adapter::{Recorder, RecordingAdapter};
use fundarb::testkit::config::settings;
use fundarb::testkit::domain::datum;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_test::{assert_err, assert_ok};

struct Harness {
    handle: MonitorHandle,
    recorders: Vec<Arc<Recorder>>,
    task: JoinHandle<()>,
}

/// Adapters `a`, `b`, `c` quoting BTC at 0.01, 0.02, 0.04.
fn spawn(enabled: &[&str], ranking: RankingPolicy) -> Harness {
    let mut adapters: Vec<Arc<dyn ExchangeAdapter>> = Vec::new();
    let mut recorders = Vec::new();
    for (id, label, rate) in [("a", "A", 0.01), ("b", "B", 0.02), ("c", "C", 0.04)] {
        let adapter = RecordingAdapter::new(id, label).with_data(vec![datum(label, "BTC", rate)]);
        recorders.push(adapter.recorder());
        adapters.push(Arc::new(adapter));
    }
    let (monitor, handle) = FundingMonitor::new(adapters, settings(enabled, ranking));
    let task = tokio::spawn(monitor.run());
    Harness {
        handle,
        recorders,
        task,
    }
}

async fn wait_for(handle: &MonitorHandle, pred: impl Fn(&DashboardView) -> bool) -> DashboardView {
    let mut views = handle.subscribe();
    timeout(Duration::from_secs(2), async move {
        loop {
            {
                let view = views.borrow_and_update();
                if pred(&view) {
                    return view.clone();
                }
            }
            views.changed().await.expect("monitor running");
        }
    })
    .await
    .expect("view reached expected state")
}

fn ids(view: &DashboardView) -> Vec<&str> {
    view.enabled.iter().map(AdapterId::as_str).collect()
}

#[tokio::test]
async fn enabled_adapters_feed_ranked_rows() {
    let h = spawn(&["a", "b", "c"], RankingPolicy::AllProfitable);
    let view = wait_for(&h.handle, |v| v.rows.len() == 3).await;

    assert_eq!(view.rows[0].long_exchange, "A");
    assert_eq!(view.rows[0].short_exchange, "C");
    assert_eq!(ids(&view), vec!["a", "b", "c"]);
    let view = wait_for(&h.handle, |v| {
        v.adapters.iter().all(|a| a.status == AdapterStatus::Ok)
    })
    .await;
    assert!(view.last_update.is_some());
    h.handle.shutdown();
}

#[tokio::test]
async fn disable_at_floor_is_rejected() {
    let h = spawn(&["a", "b"], RankingPolicy::AllProfitable);
    wait_for(&h.handle, |v| v.rows.len() == 1).await;

    assert!(!h.handle.disable(AdapterId::new("a")).await.unwrap());
    let view = h.handle.view();
    assert_eq!(ids(&view), vec!["a", "b"]);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(h.recorders[0].stops(), 0);
    h.handle.shutdown();
}

#[tokio::test]
async fn disable_discards_snapshot_and_status() {
    let h = spawn(&["a", "b", "c"], RankingPolicy::BestPerSymbol);
    wait_for(&h.handle, |v| v.rows.first().is_some_and(|r| r.short_exchange == "C")).await;

    assert!(h.handle.disable(AdapterId::new("c")).await.unwrap());
    let view = wait_for(&h.handle, |v| v.enabled.len() == 2).await;

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].short_exchange, "B");
    assert!(view.adapters.iter().all(|a| a.id.as_str() != "c"));
    assert_eq!(h.recorders[2].stops(), 1);
    h.handle.shutdown();
}

#[tokio::test]
async fn reenable_starts_a_fresh_session() {
    let h = spawn(&["a", "b", "c"], RankingPolicy::AllProfitable);
    wait_for(&h.handle, |v| v.rows.len() == 3).await;

    assert!(h.handle.disable(AdapterId::new("b")).await.unwrap());
    assert!(h.handle.enable(AdapterId::new("b")).await.unwrap());
    assert!(!h.handle.enable(AdapterId::new("b")).await.unwrap());

    let view = wait_for(&h.handle, |v| v.rows.len() == 3).await;
    assert_eq!(ids(&view), vec!["a", "b", "c"]);
    assert_eq!(h.recorders[1].starts(), 2);
    assert_eq!(h.recorders[1].stops(), 1);

    let current = h.recorders[1].last_sink().unwrap();
    assert!(current.is_active());
    assert_eq!(current.session(), 4);
    h.handle.shutdown();
}

#[tokio::test]
async fn unknown_adapter_is_an_error() {
    let h = spawn(&["a", "b"], RankingPolicy::AllProfitable);
    let err = h.handle.enable(AdapterId::new("zz")).await.unwrap_err();
    assert!(matches!(err, Error::UnknownAdapter(id) if id == "zz"));
    h.handle.shutdown();
}

#[tokio::test]
async fn interval_and_refresh_reach_running_adapters() {
    let h = spawn(&["a", "b"], RankingPolicy::AllProfitable);
    wait_for(&h.handle, |v| v.rows.len() == 1).await;

    assert_ok!(h.handle.set_interval(60));
    assert_ok!(h.handle.refresh_all().await);

    assert_eq!(h.recorders[0].intervals(), vec![30, 60]);
    assert_eq!(h.recorders[1].intervals(), vec![30, 60]);
    assert_eq!(h.recorders[0].refreshes(), 1);
    assert_eq!(h.recorders[2].refreshes(), 0);
    assert_eq!(h.handle.view().interval_secs, 60);
    h.handle.shutdown();
}

#[tokio::test]
async fn shutdown_stops_everything() {
    let h = spawn(&["a", "b", "c"], RankingPolicy::AllProfitable);
    wait_for(&h.handle, |v| v.rows.len() == 3).await;

    h.handle.shutdown();
    timeout(Duration::from_secs(2), h.task)
        .await
        .expect("monitor exits")
        .unwrap();

    assert!(h.recorders.iter().all(|r| r.stops() == 1));
    assert!(matches!(
        h.handle.enable(AdapterId::new("a")).await,
        Err(Error::MonitorStopped)
    ));
    assert_err!(h.handle.set_interval(10));
    assert_err!(h.handle.refresh_all().await);
}
