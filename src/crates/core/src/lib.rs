// Sovereign Core Library - research stream client and report export
// Layers: Util -> Infrastructure -> Export -> Research

pub mod export; // Export layer - page layout, font metrics, PDF rendering
pub mod infrastructure; // Infrastructure layer - config, SSE transport
pub mod research; // Research layer - frame decoding, session state
pub mod util; // Utility layer - errors

// Export main types
pub use util::errors::*;

pub use infrastructure::{ClientConfig, SseConnector, StreamConnection, StreamConnector};

pub use research::{
    EventLog, Frame, LogEntry, LogView, ReportSnapshot, SessionSnapshot, SessionState, StageId,
    StreamSessionController,
};

pub use export::{ExportDocument, ExportFormat};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Sovereign Core";
