//! Terminal rendering of session snapshots
//!
//! Everything here is a pure function of published state; the printer task
//! only decides when to call it.

use sovereign_core::research::{SessionSnapshot, SessionState, StageId};

const ACTIVE_MARK: &str = "●";
const DORMANT_MARK: &str = "○";

/// One line per pipeline stage, the active one marked.
pub fn render_stage_panel(active: Option<StageId>) -> String {
    let width = StageId::ALL
        .iter()
        .map(|s| s.label().len())
        .max()
        .unwrap_or(0);

    let mut panel = String::from("AGENT_STATUS\n");
    for stage in StageId::ALL {
        let (mark, status) = if active == Some(stage) {
            (ACTIVE_MARK, "ACTIVE")
        } else {
            (DORMANT_MARK, "DORMANT")
        };
        panel.push_str(&format!(
            "  {} {:<width$}  {}\n",
            mark,
            stage.label(),
            status,
            width = width
        ));
    }
    panel
}

pub fn state_label(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "IDLE",
        SessionState::Running => "RUNNING",
        SessionState::Completed => "COMPLETED",
        SessionState::Errored => "ERRORED",
    }
}

/// Tracks what has been printed so each snapshot only emits what is new.
#[derive(Debug, Default)]
pub struct SnapshotPrinter {
    printed_entries: usize,
    last_stage: Option<StageId>,
}

impl SnapshotPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_update(&mut self, snapshot: &SessionSnapshot) -> String {
        let mut out = String::new();

        // A new session resets its log.
        if snapshot.log.len() < self.printed_entries {
            self.printed_entries = 0;
            self.last_stage = None;
        }

        for entry in snapshot.log.entries_from(self.printed_entries) {
            out.push_str(&entry.display_line());
            out.push('\n');
        }
        self.printed_entries = snapshot.log.len();

        if snapshot.active_stage != self.last_stage {
            self.last_stage = snapshot.active_stage;
            out.push_str(&render_stage_panel(snapshot.active_stage));
        }
        out
    }
}
