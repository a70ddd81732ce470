//! Typed events flowing from adapters to the aggregation task.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::{AdapterId, AdapterStatus, FundingDatum};

/// What an adapter reported.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterPayload {
    /// The complete current list of readings for the adapter.
    Data(Vec<FundingDatum>),
    /// A connection or fetch state transition.
    Status(AdapterStatus),
}

/// One event published by a running adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterEvent {
    /// The adapter that produced the event.
    pub adapter_id: AdapterId,
    /// Start generation of the adapter; events from an older run are stale.
    pub session: u64,
    /// The reported payload.
    pub payload: AdapterPayload,
}

/// Sending half of the adapter event channel.
pub type EventSender = mpsc::UnboundedSender<AdapterEvent>;

/// Handle an adapter uses to publish events.
///
/// Clones share one latch. Once [`close`](Self::close) returns, no clone can
/// send again: the latch and the send are guarded by the same lock.
#[derive(Debug, Clone)]
pub struct EventSink {
    adapter_id: AdapterId,
    session: u64,
    tx: Arc<Mutex<Option<EventSender>>>,
}

impl EventSink {
    /// Create a sink for one run of `adapter_id`.
    #[must_use]
    pub fn new(adapter_id: AdapterId, session: u64, tx: EventSender) -> Self {
        Self {
            adapter_id,
            session,
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    #[must_use]
    pub fn adapter_id(&self) -> &AdapterId {
        &self.adapter_id
    }

    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }

    /// Whether the sink still accepts events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.tx.lock().is_some()
    }

    /// Publish the full current datum list. Returns `false` if dropped.
    pub fn data(&self, list: Vec<FundingDatum>) -> bool {
        self.send(AdapterPayload::Data(list))
    }

    /// Publish a status transition. Returns `false` if dropped.
    pub fn status(&self, status: AdapterStatus) -> bool {
        self.send(AdapterPayload::Status(status))
    }

    /// Latch the sink shut. Idempotent.
    pub fn close(&self) {
        self.tx.lock().take();
    }

    fn send(&self, payload: AdapterPayload) -> bool {
        let guard = self.tx.lock();
        let Some(tx) = guard.as_ref() else {
            return false;
        };
        tx.send(AdapterEvent {
            adapter_id: self.adapter_id.clone(),
            session: self.session,
            payload,
        })
        .is_ok()
    }
}
