//! Build errors for the controller builder.

use crate::controller::ControllerError;
use thiserror::Error;

/// One problem found while validating a controller definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DefinitionViolation {
    #[error("State name must not be empty")]
    EmptyStateName,

    #[error("State '{name}' is registered more than once")]
    DuplicateState { name: String },

    #[error("Transition table references unregistered state '{name}'")]
    UnregisteredState { name: String },
}

/// Errors that can occur when building a controller.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No states registered. Call .state(name, factory) before .build()")]
    NoStates,

    #[error("Invalid controller definition ({} violations)", .violations.len())]
    Invalid { violations: Vec<DefinitionViolation> },

    #[error(transparent)]
    Registration(#[from] ControllerError),
}
