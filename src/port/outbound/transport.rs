//! Transport seams used by the adapter engines.
//!
//! Real implementations live in `adapter::outbound`; tests substitute
//! scripted doubles from the `testkit` module.

use async_trait::async_trait;

use crate::error::Result;

/// Fetches a JSON document over HTTP.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` and parse the body as JSON.
    ///
    /// Non-success statuses are errors.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// One inbound WebSocket frame, reduced to what adapters care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsFrame {
    Text(String),
    Ping(Vec<u8>),
    Close(Option<String>),
    Other,
}

/// An open WebSocket connection.
#[async_trait]
pub trait WsConnection: Send {
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Answer a protocol-level ping carrying `payload` before the next read.
    async fn send_pong(&mut self, payload: Vec<u8>) -> Result<()>;

    /// Next frame, or `None` once the stream has ended.
    async fn next_frame(&mut self) -> Option<Result<WsFrame>>;

    /// Close the connection, ignoring errors.
    async fn close(&mut self);
}

/// Opens WebSocket connections.
#[async_trait]
pub trait WsConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn WsConnection>>;
}
