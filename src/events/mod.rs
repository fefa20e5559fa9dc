//! Event plumbing shared by the controller and the states it manages.
//!
//! The controller owns a private [`Emitter`] and forwards `on`/`off` to it;
//! each managed state exposes its own emitter for [`StateSignal`]s.

mod emitter;
mod kinds;

pub use emitter::{Emitter, Handler, SubscriptionId};
pub use kinds::{ControllerEvent, StateSignal};

/// Emitter a managed state uses to publish its [`StateSignal`]s.
pub type StateSignals = Emitter<StateSignal, ()>;
