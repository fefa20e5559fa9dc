//! Builder for constructing controllers.

use crate::builder::error::{BuildError, DefinitionViolation};
use crate::controller::{shared_factory, Controller, ControllerConfig, Descriptor, StateFactory};
use crate::core::{Guard, ManagedState, TransitionTable};
use std::collections::HashSet;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing controllers with a fluent API.
///
/// `build` validates the whole definition at once and reports every
/// problem it finds, not just the first.
pub struct ControllerBuilder<A: Send + Sync + 'static = ()> {
    states: Vec<Descriptor<A>>,
    table: TransitionTable,
    config: ControllerConfig,
}

impl<A> ControllerBuilder<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            table: TransitionTable::new(),
            config: ControllerConfig::default(),
        }
    }

    /// Register a state without an entry guard.
    pub fn state<S, F>(self, name: impl Into<String>, factory: F) -> Self
    where
        S: ManagedState<A> + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register(name.into(), shared_factory(factory), None)
    }

    /// Register a state whose entry is checked by `guard`.
    pub fn guarded_state<S, F>(self, name: impl Into<String>, factory: F, guard: Guard<A>) -> Self
    where
        S: ManagedState<A> + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register(name.into(), shared_factory(factory), Some(guard))
    }

    fn register(
        mut self,
        name: String,
        factory: StateFactory<A>,
        guard: Option<Guard<A>>,
    ) -> Self {
        self.states.push(Descriptor::new(name, factory, guard));
        self
    }

    /// Replace the transition table.
    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Allow entering `to` while `from` is current.
    pub fn allow(mut self, to: impl Into<String>, from: impl Into<String>) -> Self {
        self.table.allow(to, from);
        self
    }

    /// Allow `to` to be the first state activated.
    pub fn allow_initial(mut self, to: impl Into<String>) -> Self {
        self.table.allow_initial(to);
        self
    }

    /// Bound every guard and lifecycle call by `limit`.
    pub fn phase_timeout(mut self, limit: Duration) -> Self {
        self.config.phase_timeout = Some(limit);
        self
    }

    /// Keep only the `limit` most recent transitions in the history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = Some(limit);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the definition, accumulating ALL violations.
    fn validate(&self) -> Validation<(), NonEmptyVec<DefinitionViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<DefinitionViolation>>> = Vec::new();
        let mut seen = HashSet::new();

        for descriptor in &self.states {
            let name = descriptor.name();
            let check = if name.is_empty() {
                Validation::fail(DefinitionViolation::EmptyStateName)
            } else if !seen.insert(name) {
                Validation::fail(DefinitionViolation::DuplicateState {
                    name: name.to_string(),
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        for name in self.table.referenced_states() {
            let check = if seen.contains(name) {
                Validation::success(())
            } else {
                Validation::fail(DefinitionViolation::UnregisteredState {
                    name: name.to_string(),
                })
            };
            checks.push(check);
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the controller.
    /// Returns an error if no state is registered or the definition is invalid.
    pub fn build(self) -> Result<Controller<A>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        if let Validation::Failure(violations) = self.validate() {
            return Err(BuildError::Invalid {
                violations: violations.iter().cloned().collect(),
            });
        }

        let controller = Controller::with_config(self.table, self.config);
        for descriptor in self.states {
            controller.register(descriptor)?;
        }

        Ok(controller)
    }
}

impl<A> Default for ControllerBuilder<A>
where
    A: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
