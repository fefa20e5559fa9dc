//! Builder API for ergonomic controller construction.
//!
//! This module provides a fluent builder and the `transition_table!` macro
//! for declaring controllers with minimal boilerplate.

pub mod controller;
pub mod error;
pub mod macros;

pub use controller::ControllerBuilder;
pub use error::{BuildError, DefinitionViolation};
