use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    election::{ElectionEvent, EventSink},
    identity::Identity,
};

/// One event in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the log, starting from zero.
    pub sequence: u64,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: ElectionEvent<Identity>,
}

impl Display for AuditEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {}", self.sequence, self.event)
    }
}

/// Event sink that numbers, timestamps and keeps every event for later inspection.
#[derive(Debug, Default, Clone)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a log previously obtained from [`AuditLog::entries`].
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries with a sequence number of at least `sequence`.
    /// Relies on the log being contiguous, which every restored log is checked for.
    pub fn since(&self, sequence: u64) -> &[AuditEntry] {
        let start = self.entries.partition_point(|entry| entry.sequence < sequence);
        &self.entries[start..]
    }
}

impl EventSink<Identity> for AuditLog {
    fn notify(&mut self, event: ElectionEvent<Identity>) {
        let sequence = self.entries.last().map_or(0, |entry| entry.sequence + 1);
        self.entries.push(AuditEntry {
            sequence,
            timestamp: Utc::now(),
            event,
        });
    }
}
