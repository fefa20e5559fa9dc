//! Controller configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// History length used when none is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

/// Tunables for a [`Controller`](crate::Controller).
///
/// The default has no phase timeout and keeps the last
/// [`DEFAULT_HISTORY_LIMIT`] transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Upper bound for each awaited guard or lifecycle call
    pub phase_timeout: Option<Duration>,

    /// Number of completed transitions kept in the history; `None` keeps
    /// all of them
    pub history_limit: Option<usize>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            phase_timeout: None,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

impl ControllerConfig {
    pub fn with_phase_timeout(mut self, limit: Duration) -> Self {
        self.phase_timeout = Some(limit);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Keep every transition. Memory grows with the controller's lifetime.
    pub fn with_unbounded_history(mut self) -> Self {
        self.history_limit = None;
        self
    }
}
