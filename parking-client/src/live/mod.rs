//! Live channel - duplex JSON text frames to the well-known update endpoint
//!
//! [`LiveConnector`] opens channels; [`LiveChannel`] sends typed messages and
//! yields raw text frames. Parsing happens in the session so protocol errors
//! are observed in one place.

pub mod transport;

pub use transport::{MemoryChannel, MemoryConnector, MemoryPeer, MemoryServer, WsChannel, WsConnector};

use async_trait::async_trait;
use shared::LiveMessage;

use crate::ClientResult;

/// Opens live channels
#[async_trait]
pub trait LiveConnector: Send + Sync + std::fmt::Debug {
    async fn connect(&self) -> ClientResult<Box<dyn LiveChannel>>;
}

/// One open live channel
#[async_trait]
pub trait LiveChannel: Send + std::fmt::Debug {
    async fn send(&mut self, message: &LiveMessage) -> ClientResult<()>;

    /// Next text frame in arrival order; `None` once the peer closed
    async fn recv(&mut self) -> Option<ClientResult<String>>;

    /// Close the channel; safe to call more than once
    async fn close(&mut self) -> ClientResult<()>;
}
