//! Research session layer
//!
//! Decodes the pipeline's event stream and keeps the observable session
//! state: lifecycle, active stage, latest report and the operator log.

pub mod controller;
pub mod event_log;
pub mod frame;
pub mod report;
pub mod stage;
pub mod types;

pub use controller::StreamSessionController;
pub use event_log::{EventLog, LogEntry, LogView};
pub use frame::{decode, DataFrame, Frame, SENTINEL};
pub use report::{ReportBuffer, ReportSnapshot};
pub use stage::{StageId, StageTracker, StageTransition};
pub use types::{SessionSnapshot, SessionState};
