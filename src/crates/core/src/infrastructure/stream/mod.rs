//! Streaming transport
//!
//! A connector opens one connection per research topic; a connection yields
//! raw text messages until the server ends the stream or the client closes it.

pub mod sse;

pub use sse::SseConnector;

use crate::util::errors::TransportError;
use async_trait::async_trait;

#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, topic: &str) -> Result<Box<dyn StreamConnection>, TransportError>;
}

#[async_trait]
pub trait StreamConnection: Send {
    /// Next raw message. `None` once the stream has ended or been closed.
    async fn next_message(&mut self) -> Option<Result<String, TransportError>>;

    /// Release the underlying connection. Safe to call more than once.
    fn close(&mut self);
}
