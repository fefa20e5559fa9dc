//! Capability contract for states managed by a controller.
//!
//! Every value a registered factory produces implements [`ManagedState`].
//! Only `activate` and `signals` are required; the guards and `deactivate`
//! default to "allowed" and "nothing to do".

use crate::events::StateSignals;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Error type returned by state guards and lifecycle hooks.
pub type StateError = Box<dyn std::error::Error + Send + Sync>;

/// A state instance shared between the controller and event subscribers.
pub type SharedState<A> = Arc<dyn ManagedState<A>>;

/// Trait for states driven by a [`Controller`](crate::Controller).
///
/// `A` is the activation argument type the controller forwards verbatim to
/// the entry guard and to [`activate`](ManagedState::activate).
///
/// Methods take `&self`: instances are shared as [`SharedState`], so any
/// mutable data lives behind interior mutability.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use stagehand::core::{ManagedState, StateError};
/// use stagehand::events::StateSignals;
///
/// #[derive(Default)]
/// struct Lobby {
///     signals: StateSignals,
/// }
///
/// #[async_trait]
/// impl ManagedState for Lobby {
///     async fn activate(&self, _args: &()) -> Result<(), StateError> {
///         Ok(())
///     }
///
///     async fn can_deactivate(&self, next: &str) -> Result<bool, StateError> {
///         Ok(next != "lobby")
///     }
///
///     fn signals(&self) -> &StateSignals {
///         &self.signals
///     }
/// }
/// ```
#[async_trait]
pub trait ManagedState<A: Send + Sync + 'static = ()>: Send + Sync {
    /// Enter the state with the arguments passed to `Controller::activate`.
    async fn activate(&self, args: &A) -> Result<(), StateError>;

    /// Emitter on which the state publishes [`StateSignal::Done`](crate::events::StateSignal::Done).
    fn signals(&self) -> &StateSignals;

    /// Consulted, after the descriptor's entry guard, whenever the instance
    /// already exists. Default implementation allows activation.
    async fn can_activate(&self, _args: &A) -> Result<bool, StateError> {
        Ok(true)
    }

    /// Asked before leaving this state for `next`. Default implementation
    /// allows the transition.
    async fn can_deactivate(&self, _next: &str) -> Result<bool, StateError> {
        Ok(true)
    }

    /// Leave the state on the way to `next`.
    async fn deactivate(&self, _next: &str) -> Result<(), StateError> {
        Ok(())
    }
}

/// A named reference to a live state instance.
///
/// This is the payload of every [`ControllerEvent`](crate::events::ControllerEvent).
pub struct StateHandle<A: Send + Sync + 'static = ()> {
    name: String,
    state: SharedState<A>,
}

impl<A: Send + Sync + 'static> StateHandle<A> {
    pub fn new(name: impl Into<String>, state: SharedState<A>) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }

    /// Name the state was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &SharedState<A> {
        &self.state
    }

    /// Whether this handle points at the same instance as `other`.
    pub fn is(&self, other: &SharedState<A>) -> bool {
        Arc::ptr_eq(&self.state, other)
    }
}

impl<A: Send + Sync + 'static> Clone for StateHandle<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: Send + Sync + 'static> fmt::Debug for StateHandle<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
