//! Pipeline stage tracking

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Strategist,
    Scout,
    FactChecker,
    Writer,
}

impl StageId {
    /// Pipeline order, used for display only; the tracker enforces no order.
    pub const ALL: [StageId; 4] = [
        StageId::Strategist,
        StageId::Scout,
        StageId::FactChecker,
        StageId::Writer,
    ];

    pub fn from_wire(id: &str) -> Option<Self> {
        match id {
            "strategist" => Some(Self::Strategist),
            "scout" => Some(Self::Scout),
            "fact_checker" => Some(Self::FactChecker),
            "writer" => Some(Self::Writer),
            _ => None,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Strategist => "strategist",
            Self::Scout => "scout",
            Self::FactChecker => "fact_checker",
            Self::Writer => "writer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Strategist => "Strategist",
            Self::Scout => "Scout",
            Self::FactChecker => "Fact-Checker",
            Self::Writer => "Writer",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Outcome of feeding one stage announcement to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageTransition {
    Entered(StageId),
    Unrecognized(String),
}

/// Most recently announced recognized stage; `None` until the first one.
#[derive(Debug, Clone, Default)]
pub struct StageTracker {
    active: Option<StageId>,
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, raw_id: &str) -> StageTransition {
        match StageId::from_wire(raw_id) {
            Some(stage) => {
                self.active = Some(stage);
                StageTransition::Entered(stage)
            }
            None => StageTransition::Unrecognized(raw_id.to_string()),
        }
    }

    pub fn active(&self) -> Option<StageId> {
        self.active
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}
