//! Error types for the research client
//!
//! Decode failures are not represented here: a malformed frame is a value
//! (`Frame::Malformed`), never an error that leaves the event path.

use thiserror::Error;

/// Connection-level failure. Fatal to the session that owns the connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("failed to open stream: {0}")]
    Connect(String),

    #[error("stream endpoint returned HTTP {code}")]
    Status { code: u16 },

    #[error("SSE stream error: {0}")]
    Stream(String),

    #[error("SSE stream timeout after {secs}s")]
    IdleTimeout { secs: u64 },

    #[error("SSE stream closed before completion sentinel")]
    ClosedBeforeCompletion,
}

/// Main error type
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Rejected before any connection attempt (e.g. blank topic)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResearchError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

pub type ResearchResult<T> = Result<T, ResearchError>;
