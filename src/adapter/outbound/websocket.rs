//! WebSocket transport backed by `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use crate::error::Result;
use crate::port::{WsConnection, WsConnector, WsFrame};

/// Opens TLS WebSocket connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WsConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn WsConnection>> {
        info!(url, "Connecting to WebSocket");
        let (stream, response) = connect_async(url).await?;
        info!(status = %response.status(), "WebSocket connected");
        Ok(Box::new(TungsteniteConnection { stream }))
    }
}

struct TungsteniteConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl WsConnection for TungsteniteConnection {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// tungstenite queues the reply pong itself when the ping is read, so
    /// this only flushes it onto the wire.
    async fn send_pong(&mut self, _payload: Vec<u8>) -> Result<()> {
        self.stream.flush().await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<WsFrame>> {
        let frame = match self.stream.next().await? {
            Ok(Message::Text(text)) => WsFrame::Text(text),
            Ok(Message::Ping(data)) => WsFrame::Ping(data),
            Ok(Message::Close(frame)) => WsFrame::Close(frame.map(|f| f.reason.to_string())),
            Ok(_) => WsFrame::Other,
            Err(e) => return Some(Err(e.into())),
        };
        Some(Ok(frame))
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}
