//! Infrastructure layer - configuration and the streaming transport

pub mod config;
pub mod stream;

pub use config::ClientConfig;
pub use stream::{SseConnector, StreamConnection, StreamConnector};
