//! Call logging for cost-function evaluations.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use crate::estimate::Estimate;

/// One cost-function evaluation: the parameters and the full estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Copy of the parameter vector the function was called with.
    pub x: Vec<f64>,
    /// Estimate computed for `x`, regardless of what was returned.
    pub fun: Estimate,
}

/// Sink for [`LogEntry`] records.
pub trait CallRecorder: Send {
    /// Record one evaluation.
    fn record(&mut self, entry: LogEntry);
}

/// In-memory call log.
///
/// Clones share storage, so a handle kept by the caller sees entries recorded
/// through a clone attached to a cost function.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries as a pretty-printed JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries())
    }
}

impl CallRecorder for MemoryLog {
    fn record(&mut self, entry: LogEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl CallRecorder for Vec<LogEntry> {
    fn record(&mut self, entry: LogEntry) {
        self.push(entry);
    }
}
