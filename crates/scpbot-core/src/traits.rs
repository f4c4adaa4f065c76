//! Channel abstraction implemented by each chat platform.

use async_trait::async_trait;
use futures::stream::Stream;

use crate::error::Result;
use crate::types::{IncomingMessage, OutgoingMessage};

/// A bidirectional chat connection.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&mut self) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Send a reply into a thread.
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Stream of incoming messages. Transports that need a background task
    /// may instead expose a consuming listener and return a pending stream
    /// here.
    async fn listen(&self) -> Result<Box<dyn Stream<Item = IncomingMessage> + Send + Unpin>>;
}
