//! Transition history tracking.
//!
//! Completed transitions are kept as immutable records. The history itself is
//! a value: `record` returns a new history with the transition appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of one completed transition.
///
/// # Example
///
/// ```rust
/// use stagehand::core::TransitionRecord;
///
/// let first = TransitionRecord::now(None, "menu");
/// let second = TransitionRecord::now(Some("menu"), "game");
///
/// assert!(first.is_initial());
/// assert_eq!(second.from.as_deref(), Some("menu"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// The state that was current before, `None` for the initial transition
    pub from: Option<String>,
    /// The state that became current
    pub to: String,
    /// When the transition completed
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    /// Record a transition completing at the current instant.
    pub fn now(from: Option<&str>, to: impl Into<String>) -> Self {
        Self {
            from: from.map(str::to_string),
            to: to.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn is_initial(&self) -> bool {
        self.from.is_none()
    }
}

/// Ordered history of completed transitions.
///
/// # Example
///
/// ```rust
/// use stagehand::core::{TransitionHistory, TransitionRecord};
///
/// let history = TransitionHistory::new()
///     .record(TransitionRecord::now(None, "menu"))
///     .record(TransitionRecord::now(Some("menu"), "game"));
///
/// let path = history.path();
/// assert_eq!(path, vec![None, Some("menu"), Some("game")]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionHistory {
    records: Vec<TransitionRecord>,
}

impl TransitionHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, record: TransitionRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    /// Append `record` in place, dropping the oldest records beyond `limit`.
    pub(crate) fn push_bounded(&mut self, record: TransitionRecord, limit: Option<usize>) {
        self.records.push(record);
        if let Some(limit) = limit {
            let excess = self.records.len().saturating_sub(limit);
            if excess > 0 {
                self.records.drain(..excess);
            }
        }
    }

    /// Keep only the `limit` most recent records, returning a new history.
    pub fn retain_last(&self, limit: usize) -> Self {
        let skip = self.records.len().saturating_sub(limit);
        Self {
            records: self.records[skip..].to_vec(),
        }
    }

    /// States traversed: the source of the first record, then the
    /// destination of each record. `None` stands for "no state".
    pub fn path(&self) -> Vec<Option<&str>> {
        let mut path = Vec::new();
        if let Some(first) = self.records.first() {
            path.push(first.from.as_deref());
        }
        for record in &self.records {
            path.push(Some(record.to.as_str()));
        }
        path
    }

    /// Elapsed time between the first and last record.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
