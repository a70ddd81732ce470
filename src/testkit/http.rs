//! Scripted HTTP fetcher.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::port::HttpFetcher;

/// An [`HttpFetcher`] that pops scripted responses in order.
///
/// When the queue is exhausted the fallback document is returned, or a
/// connection error if there is none. Every call is counted and its URL
/// recorded, even if the response is held back by a gate.
pub struct StubFetcher {
    responses: Mutex<VecDeque<Result<Value>>>,
    fallback: Option<Value>,
    urls: Mutex<Vec<String>>,
    calls: AtomicU32,
    gate: Option<Arc<Semaphore>>,
}

/// Releases responses held by a gated [`StubFetcher`].
#[derive(Clone)]
pub struct FetchGate {
    permits: Arc<Semaphore>,
}

impl FetchGate {
    /// Let `n` pending or future requests complete.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }
}

impl StubFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: None,
            urls: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            gate: None,
        }
    }

    /// Queue one response.
    pub fn with_response(self, response: Result<Value>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Document returned once the queue is empty.
    pub fn with_fallback(mut self, document: Value) -> Self {
        self.fallback = Some(document);
        self
    }

    /// Hold every response until released through the returned gate.
    pub fn gated(mut self) -> (Self, FetchGate) {
        let permits = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&permits));
        (self, FetchGate { permits })
    }

    /// Queue a response after construction.
    pub fn push_response(&self, response: Result<Value>) {
        self.responses.lock().push_back(response);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

impl Default for StubFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpFetcher for StubFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().push(url.to_string());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let next = self.responses.lock().pop_front();
        match next {
            Some(response) => response,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| Error::Connection("no scripted response".into())),
        }
    }
}
