use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use shared::LiveMessage;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{LiveChannel, LiveConnector};
use crate::{ClientError, ClientResult};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// =============================================================================
// WebSocket
// =============================================================================

/// WebSocket connector for the live update endpoint
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LiveConnector for WsConnector {
    async fn connect(&self) -> ClientResult<Box<dyn LiveChannel>> {
        let (stream, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ClientError::ConnectionLost(format!("{}: {e}", self.url)))?;
        tracing::debug!(url = %self.url, "Live channel opened");
        Ok(Box::new(WsChannel {
            stream,
            closed: false,
        }))
    }
}

/// WebSocket live channel
pub struct WsChannel {
    stream: WsStream,
    closed: bool,
}

impl std::fmt::Debug for WsChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsChannel")
            .field("closed", &self.closed)
            .finish()
    }
}

#[async_trait]
impl LiveChannel for WsChannel {
    async fn send(&mut self, message: &LiveMessage) -> ClientResult<()> {
        let text = message.to_text()?;
        self.stream
            .send(Message::text(text))
            .await
            .map_err(|e| ClientError::ConnectionLost(e.to_string()))
    }

    async fn recv(&mut self) -> Option<ClientResult<String>> {
        if self.closed {
            return None;
        }
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text.as_str().to_owned())),
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(ClientError::ConnectionLost(e.to_string())));
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(?frame, "Live channel closed by server");
                    self.closed = true;
                    return None;
                }
                Some(Ok(other)) => {
                    // Binary, Pong, raw frames: not part of the protocol
                    tracing::debug!(len = other.len(), "Ignoring non-text frame");
                }
                Some(Err(e)) => return Some(Err(ClientError::ConnectionLost(e.to_string()))),
                None => {
                    self.closed = true;
                    return None;
                }
            }
        }
    }

    async fn close(&mut self) -> ClientResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.stream
            .close(None)
            .await
            .map_err(|e| ClientError::ConnectionLost(e.to_string()))
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Server side of one in-memory connection
#[derive(Debug)]
pub struct MemoryPeer {
    inbound: mpsc::UnboundedReceiver<LiveMessage>,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

impl MemoryPeer {
    /// Push a message to the client
    pub fn push(&self, message: &LiveMessage) -> bool {
        match message.to_text() {
            Ok(text) => self.push_raw(text),
            Err(_) => false,
        }
    }

    /// Push a raw text frame to the client
    pub fn push_raw(&self, text: impl Into<String>) -> bool {
        self.outbound
            .as_ref()
            .is_some_and(|tx| tx.send(text.into()).is_ok())
    }

    /// Next message sent by the client; `None` once the client closed
    pub async fn recv(&mut self) -> Option<LiveMessage> {
        self.inbound.recv().await
    }

    /// Close from the server side
    pub fn close(&mut self) {
        self.outbound = None;
    }
}

/// Accepts in-memory connections opened through a [`MemoryConnector`]
#[derive(Debug)]
pub struct MemoryServer {
    accepted: mpsc::UnboundedReceiver<MemoryPeer>,
}

impl MemoryServer {
    /// Wait for the next client connection
    pub async fn accept(&mut self) -> Option<MemoryPeer> {
        self.accepted.recv().await
    }

    /// Next connection if one is already pending
    pub fn try_accept(&mut self) -> Option<MemoryPeer> {
        self.accepted.try_recv().ok()
    }
}

/// In-memory connector, used by tests and local demos
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<MemoryPeer>,
    attempts: Arc<AtomicUsize>,
    refusals: Arc<Mutex<usize>>,
}

impl MemoryConnector {
    /// Create a connected connector/server pair
    pub fn pair() -> (Self, MemoryServer) {
        let (accept_tx, accepted) = mpsc::unbounded_channel();
        (
            Self {
                accept_tx,
                attempts: Arc::new(AtomicUsize::new(0)),
                refusals: Arc::new(Mutex::new(0)),
            },
            MemoryServer { accepted },
        )
    }

    /// Refuse the next `count` connection attempts
    pub fn refuse_next(&self, count: usize) {
        *self.refusals.lock() += count;
    }

    /// Connection attempts so far, refused ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LiveConnector for MemoryConnector {
    async fn connect(&self) -> ClientResult<Box<dyn LiveChannel>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        {
            let mut refusals = self.refusals.lock();
            if *refusals > 0 {
                *refusals -= 1;
                return Err(ClientError::ConnectionLost("connection refused".into()));
            }
        }

        let (to_server, inbound) = mpsc::unbounded_channel();
        let (outbound, from_server) = mpsc::unbounded_channel();
        self.accept_tx
            .send(MemoryPeer {
                inbound,
                outbound: Some(outbound),
            })
            .map_err(|_| ClientError::ConnectionLost("server is gone".into()))?;

        Ok(Box::new(MemoryChannel {
            to_server: Some(to_server),
            from_server,
        }))
    }
}

/// Client side of one in-memory connection
#[derive(Debug)]
pub struct MemoryChannel {
    to_server: Option<mpsc::UnboundedSender<LiveMessage>>,
    from_server: mpsc::UnboundedReceiver<String>,
}

#[async_trait]
impl LiveChannel for MemoryChannel {
    async fn send(&mut self, message: &LiveMessage) -> ClientResult<()> {
        let tx = self
            .to_server
            .as_ref()
            .ok_or_else(|| ClientError::ConnectionLost("channel closed".into()))?;
        tx.send(message.clone())
            .map_err(|_| ClientError::ConnectionLost("server closed".into()))
    }

    async fn recv(&mut self) -> Option<ClientResult<String>> {
        self.from_server.recv().await.map(Ok)
    }

    async fn close(&mut self) -> ClientResult<()> {
        self.to_server = None;
        self.from_server.close();
        Ok(())
    }
}
