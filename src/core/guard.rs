//! Entry guards for controller states.
//!
//! A guard decides whether a state may be entered with a given set of
//! activation arguments. Guards are Stillwater effects whose environment is
//! the argument value, so a guard that answers immediately and one that has
//! to await something are evaluated the same way.

use super::state::StateError;
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;

/// Effect produced by a guard: reads the activation arguments, yields a verdict.
pub type GuardEffect<A> = BoxedEffect<bool, StateError, A>;

type GuardFactory<A> = Arc<dyn Fn() -> GuardEffect<A> + Send + Sync>;

/// Predicate consulted before a state is entered.
///
/// Stores a factory that creates a fresh effect for every evaluation.
///
/// # Example
///
/// ```rust
/// use stagehand::core::Guard;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let adults_only = Guard::new(|age: &u32| *age >= 18);
///
/// assert!(adults_only.check(&21).await.unwrap());
/// assert!(!adults_only.check(&12).await.unwrap());
/// # });
/// ```
pub struct Guard<A> {
    factory: GuardFactory<A>,
}

impl<A> Guard<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a guard from a plain predicate over the activation arguments.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&A) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self::from_effect(move || {
            let predicate = Arc::clone(&predicate);
            from_fn(move |args: &A| Ok(predicate(args))).boxed()
        })
    }

    /// Create a guard from an effect factory.
    ///
    /// Use this when the verdict comes from an effectful computation or may
    /// fail; a failed effect is reported as a guard failure, not a rejection.
    pub fn from_effect<F>(factory: F) -> Self
    where
        F: Fn() -> GuardEffect<A> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Guard that always allows entry.
    pub fn allow() -> Self {
        Self::from_effect(|| pure(true).boxed())
    }

    /// Guard that always refuses entry.
    pub fn deny() -> Self {
        Self::from_effect(|| pure(false).boxed())
    }

    /// Evaluate the guard against `args`.
    pub async fn check(&self, args: &A) -> Result<bool, StateError> {
        (self.factory)().run(args).await
    }
}

impl<A> Clone for Guard<A> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<A> std::fmt::Debug for Guard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard")
    }
}
