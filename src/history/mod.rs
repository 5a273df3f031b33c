//! Command history
//!
//! A bounded, append-only log of the canonical command for every accepted
//! mutation. The log is observational only: nothing in the registry reads it
//! back to decide whether a mutation is allowed.

pub mod command;
pub mod parse;
pub mod replay;

pub use command::{Command, RunCommand};
pub use parse::parse_command;
pub use replay::{execute, replay, ReplayReport};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Number of entries kept by default
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A recorded command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    /// Position in the overall history, starting at 1
    pub sequence: u64,
    /// Canonical command string
    pub command: String,
    /// When the mutation was accepted
    pub timestamp: DateTime<Utc>,
}

/// Bounded FIFO of recorded commands
#[derive(Debug, Clone)]
pub struct CommandLog {
    entries: VecDeque<CommandEntry>,
    limit: usize,
    next_sequence: u64,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl CommandLog {
    /// Create an empty log keeping at most `limit` entries
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
            next_sequence: 1,
        }
    }

    /// Append a command, evicting the oldest entries beyond the limit
    pub fn record(&mut self, command: impl Into<String>) -> &CommandEntry {
        let entry = CommandEntry {
            sequence: self.next_sequence,
            command: command.into(),
            timestamp: Utc::now(),
        };
        self.next_sequence += 1;

        tracing::debug!("Recorded command #{}: {}", entry.sequence, entry.command);

        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }

        &self.entries[self.entries.len() - 1]
    }

    /// Remove every entry. Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.entries.iter()
    }

    /// Command strings, oldest first
    pub fn commands(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.command.as_str()).collect()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&CommandEntry> {
        self.entries.back()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_evict() {
        let mut log = CommandLog::new(3);
        for i in 1..=5 {
            log.record(format!("docker volume create v{}", i));
        }

        assert_eq!(log.len(), 3);
        assert_eq!(
            log.commands(),
            vec![
                "docker volume create v3",
                "docker volume create v4",
                "docker volume create v5"
            ]
        );
        let sequences: Vec<u64> = log.entries().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![3, 4, 5]);
    }

    #[test]
    fn test_clear_keeps_sequence() {
        let mut log = CommandLog::default();
        log.record("docker pull nginx:latest");
        log.clear();
        assert!(log.is_empty());

        let entry = log.record("docker pull redis:alpine");
        assert_eq!(entry.sequence, 2);
        assert_eq!(log.limit(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let mut log = CommandLog::default();
        for _ in 0..10 {
            log.record("docker stop web");
        }
        let stamps: Vec<_> = log.entries().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }
}
