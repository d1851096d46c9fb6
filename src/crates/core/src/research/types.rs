use super::event_log::LogView;
use super::report::ReportSnapshot;
use super::stage::StageId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Completed,
    Errored,
}

impl SessionState {
    /// Whether an "in progress" indication should be shown
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Only `Errored` is presented to the operator as a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Errored)
    }
}

/// Everything a UI collaborator may read, published after each mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub topic: String,
    pub state: SessionState,
    pub active_stage: Option<StageId>,
    pub report: ReportSnapshot,
    /// Shares storage with the controller's log; cheap to publish
    pub log: LogView,
}
