//! Latest report text, replaced wholesale on every content frame

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSnapshot {
    pub text: String,
    /// Number of accepted content frames in this session
    pub revision: u64,
}

impl ReportSnapshot {
    pub fn is_empty(&self) -> bool {
        self.revision == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReportBuffer {
    current: ReportSnapshot,
}

impl ReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins; no merging with the previous text.
    pub fn update(&mut self, text: String) -> u64 {
        self.current = ReportSnapshot {
            text,
            revision: self.current.revision + 1,
        };
        self.current.revision
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        self.current.clone()
    }

    pub fn text(&self) -> &str {
        &self.current.text
    }

    pub fn revision(&self) -> u64 {
        self.current.revision
    }

    pub fn reset(&mut self) {
        self.current = ReportSnapshot::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_is_empty() {
        let buffer = ReportBuffer::new();
        assert!(buffer.snapshot().is_empty());
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn update_replaces_text_and_bumps_revision() {
        let mut buffer = ReportBuffer::new();
        assert_eq!(buffer.update("Hello".to_string()), 1);
        assert_eq!(buffer.update("Hello world".to_string()), 2);
        assert_eq!(buffer.text(), "Hello world");
    }

    #[test]
    fn shorter_update_is_not_merged() {
        let mut buffer = ReportBuffer::new();
        buffer.update("a long first draft".to_string());
        buffer.update("short".to_string());
        assert_eq!(buffer.text(), "short");
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let mut buffer = ReportBuffer::new();
        buffer.update("v1".to_string());
        let snapshot = buffer.snapshot();
        buffer.update("v2".to_string());
        assert_eq!(snapshot.text, "v1");
        assert_eq!(snapshot.revision, 1);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut buffer = ReportBuffer::new();
        buffer.update("v1".to_string());
        buffer.reset();
        assert_eq!(buffer.snapshot(), ReportSnapshot::default());
    }
}
