//! In-memory adapter that records how it is driven.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{AdapterId, AdapterStatus, FundingDatum};
use crate::port::{AdapterControl, AdapterKind, EventSink, ExchangeAdapter, StartContext};

/// Counters and captured sinks shared between a [`RecordingAdapter`] and
/// the test.
#[derive(Default)]
pub struct Recorder {
    starts: AtomicU32,
    stops: AtomicU32,
    refreshes: AtomicU32,
    intervals: Mutex<Vec<u64>>,
    sinks: Mutex<Vec<EventSink>>,
    data: Mutex<Option<Vec<FundingDatum>>>,
}

impl Recorder {
    pub fn starts(&self) -> u32 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> u32 {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> u32 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Every interval passed at start or through `set_interval_secs`.
    pub fn intervals(&self) -> Vec<u64> {
        self.intervals.lock().clone()
    }

    /// Sink of the most recent start.
    pub fn last_sink(&self) -> Option<EventSink> {
        self.sinks.lock().last().cloned()
    }

    /// Replace the list published on start and on every manual refresh.
    pub fn set_data(&self, list: Vec<FundingDatum>) {
        *self.data.lock() = Some(list);
    }

    fn publish(&self, sink: &EventSink) {
        let list = self.data.lock().clone();
        if let Some(list) = list {
            sink.data(list);
            sink.status(AdapterStatus::Ok);
        }
    }
}

/// An [`ExchangeAdapter`] with no I/O.
///
/// When data is set, it is published followed by `Ok` synchronously inside
/// `start` and on every manual refresh.
pub struct RecordingAdapter {
    id: AdapterId,
    label: &'static str,
    kind: AdapterKind,
    recorder: Arc<Recorder>,
}

impl RecordingAdapter {
    pub fn new(id: &str, label: &'static str) -> Self {
        Self {
            id: AdapterId::new(id),
            label,
            kind: AdapterKind::Pull,
            recorder: Arc::new(Recorder::default()),
        }
    }

    pub fn with_kind(mut self, kind: AdapterKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_data(self, list: Vec<FundingDatum>) -> Self {
        self.recorder.set_data(list);
        self
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }
}

impl ExchangeAdapter for RecordingAdapter {
    fn id(&self) -> &AdapterId {
        &self.id
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    fn start(&self, ctx: StartContext) -> Arc<dyn AdapterControl> {
        self.recorder.starts.fetch_add(1, Ordering::SeqCst);
        self.recorder.intervals.lock().push(ctx.interval_secs);
        self.recorder.sinks.lock().push(ctx.sink.clone());
        self.recorder.publish(&ctx.sink);

        Arc::new(RecordingControl {
            sink: ctx.sink,
            recorder: Arc::clone(&self.recorder),
        })
    }
}

struct RecordingControl {
    sink: EventSink,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl AdapterControl for RecordingControl {
    fn stop(&self) {
        self.sink.close();
        self.recorder.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn set_interval_secs(&self, secs: u64) {
        self.recorder.intervals.lock().push(secs);
    }

    async fn manual_refresh(&self) {
        self.recorder.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.sink.is_active() {
            self.recorder.publish(&self.sink);
        }
    }
}
