//! The game log: an append-only, ordered record of typed events.
//!
//! The log is the sole audit trail of a match. Entries are never removed or
//! rewritten; the only mutation is [`GameLog::append`].
//!
//! Backed by `im::Vector`, so cloning a snapshot (which every transition
//! does) shares the existing entries instead of copying them.

mod event;

pub use event::{LogEvent, LoyaltyOutcome, TwoPartyOutcome};

use im::Vector;
use serde::{Deserialize, Serialize};

/// A timestamped event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,

    #[serde(flatten)]
    pub event: LogEvent,
}

/// Ordered, append-only event log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameLog {
    entries: Vector<LogEntry>,
}

impl GameLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event stamped with `timestamp`.
    pub fn append(&mut self, timestamp: u64, event: LogEvent) {
        self.entries.push_back(LogEntry { timestamp, event });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries whose `type` tag equals `kind`.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.entries.iter().filter(move |e| e.event.kind() == kind)
    }
}
