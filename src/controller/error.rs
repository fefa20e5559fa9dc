//! Controller errors.

use crate::core::StateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Awaited step of the transition pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    CanDeactivate,
    CanActivate,
    Deactivate,
    Activate,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CanDeactivate => "can-deactivate",
            Self::CanActivate => "can-activate",
            Self::Deactivate => "deactivate",
            Self::Activate => "activate",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`Controller`](crate::Controller) operations.
///
/// Every variant leaves the controller idle: a failed `activate` never blocks
/// the next one.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Already in a state transition to '{pending}'")]
    ConcurrentTransition { pending: String },

    #[error("Unknown state '{name}'")]
    UnknownState { name: String },

    #[error("Illegal state transition from {} to '{to}'", .from.as_deref().unwrap_or("<initial>"))]
    IllegalTransition { from: Option<String>, to: String },

    #[error("State '{state}' rejected transition to '{target}' ({phase} guard)")]
    GuardRejected {
        phase: Phase,
        state: String,
        target: String,
    },

    #[error("{phase} guard of state '{state}' failed: {source}")]
    GuardFailed {
        phase: Phase,
        state: String,
        #[source]
        source: StateError,
    },

    #[error("{phase} of state '{state}' failed: {source}")]
    StateFailed {
        phase: Phase,
        state: String,
        #[source]
        source: StateError,
    },

    #[error("{phase} of state '{state}' did not complete within {limit:?}")]
    PhaseTimedOut {
        phase: Phase,
        state: String,
        limit: Duration,
    },

    #[error("Controller was destroyed during the transition to '{target}'")]
    Destroyed { target: String },

    #[error("State name must not be empty")]
    EmptyStateName,

    #[error("State '{name}' is already instantiated and cannot be redefined")]
    AlreadyInstantiated { name: String },
}

impl ControllerError {
    /// Stable machine-readable code for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerError::ConcurrentTransition { .. } => "CONCURRENT_TRANSITION",
            ControllerError::UnknownState { .. } => "UNKNOWN_STATE",
            ControllerError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            ControllerError::GuardRejected { .. } => "GUARD_REJECTED",
            ControllerError::GuardFailed { .. } => "GUARD_FAILED",
            ControllerError::StateFailed { .. } => "STATE_FAILED",
            ControllerError::PhaseTimedOut { .. } => "PHASE_TIMED_OUT",
            ControllerError::Destroyed { .. } => "DESTROYED",
            ControllerError::EmptyStateName => "EMPTY_STATE_NAME",
            ControllerError::AlreadyInstantiated { .. } => "ALREADY_INSTANTIATED",
        }
    }

    /// Whether a guard declined or failed the transition.
    pub fn is_guard_rejection(&self) -> bool {
        matches!(
            self,
            ControllerError::GuardRejected { .. } | ControllerError::GuardFailed { .. }
        )
    }
}
