//! Exchange adapter protocol.
//!
//! Every exchange is wrapped by one [`ExchangeAdapter`]. Starting it yields an
//! [`AdapterControl`] that owns all of that run's timers and connections.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use super::event::EventSink;
use crate::domain::AdapterId;

/// How an adapter obtains data. Metadata only; the aggregator treats all
/// adapters identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    /// Timer-driven request/response polling.
    Pull,
    /// Persistent streaming connection with server-initiated updates.
    Push,
}

impl AdapterKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Push => "push",
        }
    }
}

/// Everything an adapter needs to start.
#[derive(Debug, Clone)]
pub struct StartContext {
    /// Where data and status events are published.
    pub sink: EventSink,
    /// Polling period in seconds for pull adapters; `0` disables polling.
    pub interval_secs: u64,
}

/// Control handle for one running adapter.
#[async_trait]
pub trait AdapterControl: Send + Sync {
    /// Terminate all activity. Idempotent; no event is published after return.
    fn stop(&self);

    /// Change the polling cadence, rescheduling any existing timer.
    ///
    /// Only pull adapters poll; the default does nothing.
    fn set_interval_secs(&self, _secs: u64) {}

    /// Run one out-of-band fetch and wait for it to settle.
    ///
    /// Only pull adapters fetch on demand; the default completes immediately.
    async fn manual_refresh(&self) {}
}

/// A source of normalized funding data for one exchange.
pub trait ExchangeAdapter: Send + Sync {
    /// Stable identifier, e.g. `"lighter"`.
    fn id(&self) -> &AdapterId;

    /// Display label of the venue, used as the datum `exchange`.
    fn label(&self) -> &'static str;

    fn kind(&self) -> AdapterKind;

    /// Start the adapter. Must be called from within a Tokio runtime.
    fn start(&self, ctx: StartContext) -> Arc<dyn AdapterControl>;
}
