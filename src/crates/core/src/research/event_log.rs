//! Operator-facing trace of a session

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] message`
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

type Storage = Arc<RwLock<Vec<LogEntry>>>;

fn read(storage: &Storage) -> RwLockReadGuard<'_, Vec<LogEntry>> {
    storage.read().unwrap_or_else(PoisonError::into_inner)
}

/// Append-only; unbounded for the lifetime of one session.
#[derive(Debug, Default)]
pub struct EventLog {
    storage: Storage,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now(),
            message: message.into(),
        };
        self.storage
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        read(&self.storage).clone()
    }

    pub fn len(&self) -> usize {
        read(&self.storage).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The log as it stands now. Shares storage instead of copying entries.
    pub fn view(&self) -> LogView {
        LogView {
            len: self.len(),
            storage: self.storage.clone(),
        }
    }

    /// Starts the log over for a new session. Views taken earlier keep the
    /// old entries. Not available to readers.
    pub(crate) fn reset(&mut self) {
        self.storage = Storage::default();
    }
}

/// Read-only prefix of an `EventLog`, fixed at the length it had when taken.
#[derive(Clone, Default)]
pub struct LogView {
    storage: Storage,
    len: usize,
}

impl LogView {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries_from(0)
    }

    /// Entries at positions `start..len`; empty when `start >= len`.
    pub fn entries_from(&self, start: usize) -> Vec<LogEntry> {
        let entries = read(&self.storage);
        entries
            .get(start.min(self.len)..self.len)
            .map(<[LogEntry]>::to_vec)
            .unwrap_or_default()
    }
}

impl PartialEq for LogView {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.entries() == other.entries()
    }
}

impl Eq for LogView {}

impl fmt::Debug for LogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

impl Serialize for LogView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries())
    }
}

impl<'de> Deserialize<'de> for LogView {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<LogEntry>::deserialize(deserializer)?;
        Ok(Self {
            len: entries.len(),
            storage: Arc::new(RwLock::new(entries)),
        })
    }
}
