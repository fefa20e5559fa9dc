//! Transition adjacency table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Where a transition comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    /// No state is current yet
    Initial,
    /// The named state is current
    State(String),
}

impl Source {
    /// Source for the controller's current state name.
    pub fn from_current(current: Option<&str>) -> Self {
        match current {
            Some(name) => Self::State(name.to_string()),
            None => Self::Initial,
        }
    }

    pub fn state_name(&self) -> Option<&str> {
        match self {
            Self::Initial => None,
            Self::State(name) => Some(name),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => f.write_str("<initial>"),
            Self::State(name) => write!(f, "'{name}'"),
        }
    }
}

/// Maps a destination state to the sources allowed to enter it.
///
/// Destinations without an entry are open: any source may enter them.
/// Destinations with an entry may only be entered from a listed source.
///
/// # Example
///
/// ```rust
/// use stagehand::core::TransitionTable;
///
/// let mut table = TransitionTable::new();
/// table.allow_initial("menu").allow("game", "menu").allow("menu", "game");
///
/// assert!(table.permits(None, "menu"));
/// assert!(table.permits(Some("menu"), "game"));
/// assert!(!table.permits(None, "game"));
/// assert!(table.permits(Some("game"), "credits")); // no entry, open
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTable {
    entries: BTreeMap<String, BTreeSet<Source>>,
}

impl TransitionTable {
    /// Create an empty, fully open table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow entering `to` while `from` is current.
    pub fn allow(&mut self, to: impl Into<String>, from: impl Into<String>) -> &mut Self {
        self.restrict(to).insert(Source::State(from.into()));
        self
    }

    /// Allow `to` to be the first state ever activated.
    pub fn allow_initial(&mut self, to: impl Into<String>) -> &mut Self {
        self.restrict(to).insert(Source::Initial);
        self
    }

    /// Make `to` restricted without allowing any source yet.
    ///
    /// Returns the (possibly empty) source set for further edits.
    pub fn restrict(&mut self, to: impl Into<String>) -> &mut BTreeSet<Source> {
        self.entries.entry(to.into()).or_default()
    }

    /// Whether entering `to` is allowed while `from` is current.
    pub fn permits(&self, from: Option<&str>, to: &str) -> bool {
        match self.entries.get(to) {
            None => true,
            Some(sources) => sources.contains(&Source::from_current(from)),
        }
    }

    /// Allowed sources for `to`, or `None` if `to` is open.
    pub fn sources(&self, to: &str) -> Option<&BTreeSet<Source>> {
        self.entries.get(to)
    }

    pub fn is_open(&self, to: &str) -> bool {
        !self.entries.contains_key(to)
    }

    /// Restricted destinations, in name order.
    pub fn destinations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every state name mentioned by the table, as destination or source.
    pub fn referenced_states(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        for (to, sources) in &self.entries {
            names.insert(to.as_str());
            names.extend(sources.iter().filter_map(Source::state_name));
        }
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
