//! Stagehand: a guarded asynchronous state controller
//!
//! A [`Controller`] owns a set of named states, builds each one lazily the
//! first time it is activated, and moves between them one transition at a
//! time. Every transition runs the same pipeline: validate the edge against
//! the [`TransitionTable`](core::TransitionTable), ask the outgoing state
//! whether it may leave, ask the incoming state's guard whether it may be
//! entered, deactivate, activate. Lifecycle events are published at each
//! step.
//!
//! # Core Concepts
//!
//! - **ManagedState**: the capability contract every state implements
//! - **Guards**: asynchronous predicates that may veto a transition
//! - **Transition table**: which states may follow which
//! - **Events**: `state-created`, `state-activated`, `state-deactivated`,
//!   `state-done` and `destroy` notifications
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use stagehand::core::{Guard, ManagedState, StateError};
//! use stagehand::events::StateSignals;
//! use stagehand::{transition_table, ControllerBuilder, ControllerError};
//!
//! #[derive(Default)]
//! struct Step {
//!     signals: StateSignals,
//! }
//!
//! #[async_trait]
//! impl ManagedState<u32> for Step {
//!     async fn activate(&self, _quantity: &u32) -> Result<(), StateError> {
//!         Ok(())
//!     }
//!
//!     fn signals(&self) -> &StateSignals {
//!         &self.signals
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let controller = ControllerBuilder::<u32>::new()
//!     .state("cart", Step::default)
//!     .guarded_state("checkout", Step::default, Guard::new(|quantity: &u32| *quantity > 0))
//!     .table(transition_table! {
//!         "cart" <= [initial, "checkout"],
//!         "checkout" <= ["cart"],
//!     })
//!     .build()
//!     .unwrap();
//!
//! controller.activate("cart", 0).await.unwrap();
//!
//! let refused = controller.activate("checkout", 0).await;
//! assert!(matches!(refused, Err(ControllerError::GuardRejected { .. })));
//! assert_eq!(controller.current().as_deref(), Some("cart"));
//!
//! controller.activate("checkout", 2).await.unwrap();
//! assert_eq!(controller.current().as_deref(), Some("checkout"));
//! # });
//! ```

pub mod builder;
pub mod controller;
pub mod core;
pub mod events;

// Re-export commonly used types
pub use builder::{BuildError, ControllerBuilder};
pub use controller::{Controller, ControllerConfig, ControllerError, Phase};
pub use self::core::{Guard, ManagedState, StateError, StateHandle, TransitionTable};
pub use events::{ControllerEvent, StateSignal, StateSignals};
