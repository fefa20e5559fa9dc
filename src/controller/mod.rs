//! The state controller.
//!
//! # Key Concepts
//!
//! - **Registry**: named descriptors whose states are built lazily, once
//! - **Pipeline**: validate, guard, deactivate, activate, each awaited in turn
//! - **Permit**: at most one pipeline in flight; released on every exit path
//! - **Events**: lifecycle notifications on the controller's own emitter

mod config;
mod error;
mod machine;
mod permit;
mod registry;

pub use config::{ControllerConfig, DEFAULT_HISTORY_LIMIT};
pub use error::{ControllerError, Phase};
pub use machine::Controller;

pub(crate) use registry::{shared_factory, Descriptor, StateFactory};
