//! Core controller types.
//!
//! This module contains the building blocks the controller is made of:
//! - The `ManagedState` capability contract and `StateHandle` references
//! - Effect-backed entry guards
//! - The transition adjacency table
//! - Immutable transition history

mod guard;
mod history;
mod state;
mod table;

pub use guard::{Guard, GuardEffect};
pub use history::{TransitionHistory, TransitionRecord};
pub use state::{ManagedState, SharedState, StateError, StateHandle};
pub use table::{Source, TransitionTable};
