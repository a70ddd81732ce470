//! Scripted WebSocket transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::port::{WsConnection, WsConnector, WsFrame};

/// What one `connect()` call does.
#[derive(Debug, Clone)]
pub enum ConnectScript {
    /// The connection attempt fails.
    Fail,
    /// The connection opens and yields these frames.
    ///
    /// With `hold_open` the stream stays silent after the last frame instead
    /// of ending.
    Frames { frames: Vec<WsFrame>, hold_open: bool },
}

impl ConnectScript {
    /// Yield `frames`, then end the stream.
    pub fn frames(frames: Vec<WsFrame>) -> Self {
        Self::Frames {
            frames,
            hold_open: false,
        }
    }

    /// Yield `frames`, then stay silent until closed.
    pub fn held(frames: Vec<WsFrame>) -> Self {
        Self::Frames {
            frames,
            hold_open: true,
        }
    }
}

/// Everything sent over any connection opened by a [`ScriptedConnector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Pong(Vec<u8>),
}

#[derive(Default)]
struct Shared {
    sent: Mutex<Vec<Sent>>,
    urls: Mutex<Vec<String>>,
    connects: AtomicU32,
    closes: AtomicU32,
}

/// A [`WsConnector`] that plays back one [`ConnectScript`] per call.
///
/// Once the scripts are exhausted every further attempt fails.
#[derive(Clone)]
pub struct ScriptedConnector {
    scripts: Arc<Mutex<VecDeque<ConnectScript>>>,
    shared: Arc<Shared>,
    gate: Option<Arc<Semaphore>>,
}

/// Releases connection attempts held by a gated [`ScriptedConnector`].
#[derive(Clone)]
pub struct ConnectGate {
    permits: Arc<Semaphore>,
}

impl ConnectGate {
    /// Let `n` pending or future connection attempts resolve.
    pub fn release(&self, n: usize) {
        self.permits.add_permits(n);
    }
}

impl ScriptedConnector {
    pub fn new(scripts: Vec<ConnectScript>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into())),
            shared: Arc::new(Shared::default()),
            gate: None,
        }
    }

    /// Hold every connection attempt until released through the returned gate.
    pub fn gated(mut self) -> (Self, ConnectGate) {
        let permits = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&permits));
        (self, ConnectGate { permits })
    }

    pub fn connect_count(&self) -> u32 {
        self.shared.connects.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> u32 {
        self.shared.closes.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.shared.sent.lock().clone()
    }

    /// Text frames sent, in order.
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text) => Some(text),
                Sent::Pong(_) => None,
            })
            .collect()
    }

    pub fn urls(&self) -> Vec<String> {
        self.shared.urls.lock().clone()
    }
}

#[async_trait]
impl WsConnector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn WsConnection>> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        self.shared.urls.lock().push(url.to_string());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let script = self.scripts.lock().pop_front();
        match script {
            Some(ConnectScript::Frames { frames, hold_open }) => Ok(Box::new(ScriptedConnection {
                frames: frames.into(),
                hold_open,
                shared: Arc::clone(&self.shared),
            })),
            Some(ConnectScript::Fail) | None => {
                Err(Error::Connection(format!("scripted failure for {url}")))
            }
        }
    }
}

struct ScriptedConnection {
    frames: VecDeque<WsFrame>,
    hold_open: bool,
    shared: Arc<Shared>,
}

#[async_trait]
impl WsConnection for ScriptedConnection {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.shared.sent.lock().push(Sent::Text(text));
        Ok(())
    }

    async fn send_pong(&mut self, payload: Vec<u8>) -> Result<()> {
        self.shared.sent.lock().push(Sent::Pong(payload));
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<WsFrame>> {
        if let Some(frame) = self.frames.pop_front() {
            return Some(Ok(frame));
        }
        if self.hold_open {
            return std::future::pending().await;
        }
        None
    }

    async fn close(&mut self) {
        self.shared.closes.fetch_add(1, Ordering::SeqCst);
    }
}
