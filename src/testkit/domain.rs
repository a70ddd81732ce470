//! Builders for funding data and event plumbing used across tests.

use tokio::sync::mpsc;

use crate::domain::{AdapterId, AdapterStatus, FundingDatum, HOUR_MS};
use crate::port::{AdapterEvent, AdapterPayload, EventSink};

/// An hourly reading, so `rate_per_hour == rate`.
pub fn datum(exchange: &str, symbol: &str, rate: f64) -> FundingDatum {
    datum_with_period(exchange, symbol, rate, HOUR_MS)
}

/// A reading over an explicit native period.
pub fn datum_with_period(exchange: &str, symbol: &str, rate: f64, period_ms: u64) -> FundingDatum {
    FundingDatum::try_new(exchange, symbol, rate, period_ms as i64)
        .unwrap_or_else(|e| panic!("invalid test datum: {e}"))
}

/// A sink for `id` plus the receiving end of its channel.
pub fn sink(id: &str, session: u64) -> (EventSink, mpsc::UnboundedReceiver<AdapterEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSink::new(AdapterId::new(id), session, tx), rx)
}

/// Everything currently queued on `rx`.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<AdapterEvent>) -> Vec<AdapterPayload> {
    let mut payloads = Vec::new();
    while let Ok(event) = rx.try_recv() {
        payloads.push(event.payload);
    }
    payloads
}

/// Only the status payloads, in order.
pub fn statuses(payloads: &[AdapterPayload]) -> Vec<AdapterStatus> {
    payloads
        .iter()
        .filter_map(|p| match p {
            AdapterPayload::Status(s) => Some(*s),
            AdapterPayload::Data(_) => None,
        })
        .collect()
}

/// Only the data payloads, in order.
pub fn data(payloads: &[AdapterPayload]) -> Vec<Vec<FundingDatum>> {
    payloads
        .iter()
        .filter_map(|p| match p {
            AdapterPayload::Data(list) => Some(list.clone()),
            AdapterPayload::Status(_) => None,
        })
        .collect()
}
