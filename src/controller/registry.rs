//! Arena of state descriptors.

use super::error::ControllerError;
use crate::core::{Guard, ManagedState, SharedState, StateHandle};
use crate::events::SubscriptionId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Zero-argument constructor for a state instance.
pub(crate) type StateFactory<A> = Arc<dyn Fn() -> SharedState<A> + Send + Sync>;

/// Wrap a concrete state constructor into a [`StateFactory`].
pub(crate) fn shared_factory<A, S, F>(factory: F) -> StateFactory<A>
where
    A: Send + Sync + 'static,
    S: ManagedState<A> + 'static,
    F: Fn() -> S + Send + Sync + 'static,
{
    Arc::new(move || Arc::new(factory()) as SharedState<A>)
}

/// A constructed state plus the controller's subscription on its done signal.
pub(crate) struct Instance<A: Send + Sync + 'static> {
    pub(crate) state: SharedState<A>,
    pub(crate) done: SubscriptionId,
}

/// One registered state slot. Everything but `instance` is fixed at
/// registration; `instance` is set at most once.
pub(crate) struct Descriptor<A: Send + Sync + 'static> {
    name: String,
    factory: StateFactory<A>,
    entry_guard: Option<Guard<A>>,
    instance: OnceLock<Instance<A>>,
}

impl<A: Send + Sync + 'static> Descriptor<A> {
    pub(crate) fn new(
        name: impl Into<String>,
        factory: StateFactory<A>,
        entry_guard: Option<Guard<A>>,
    ) -> Self {
        Self {
            name: name.into(),
            factory,
            entry_guard,
            instance: OnceLock::new(),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn factory(&self) -> StateFactory<A> {
        Arc::clone(&self.factory)
    }

    pub(crate) fn entry_guard(&self) -> Option<&Guard<A>> {
        self.entry_guard.as_ref()
    }

    pub(crate) fn instance(&self) -> Option<&Instance<A>> {
        self.instance.get()
    }

    pub(crate) fn handle(&self) -> Option<StateHandle<A>> {
        self.instance()
            .map(|instance| StateHandle::new(self.name.clone(), Arc::clone(&instance.state)))
    }

    /// Store the constructed instance. Hands it back if one is already set.
    pub(crate) fn set_instance(&self, instance: Instance<A>) -> Result<(), Instance<A>> {
        self.instance.set(instance)
    }

    pub(crate) fn into_instance(self) -> Option<Instance<A>> {
        self.instance.into_inner()
    }
}

/// Descriptors in registration order, indexed by name.
pub(crate) struct Registry<A: Send + Sync + 'static> {
    slots: Vec<Descriptor<A>>,
    index: HashMap<String, usize>,
}

impl<A: Send + Sync + 'static> Registry<A> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register `descriptor`, replacing a same-named one that was never
    /// instantiated.
    pub(crate) fn insert(&mut self, descriptor: Descriptor<A>) -> Result<(), ControllerError> {
        if descriptor.name().is_empty() {
            return Err(ControllerError::EmptyStateName);
        }
        let existing = self.index.get(descriptor.name()).copied();
        match existing {
            Some(slot) if self.slots[slot].instance().is_some() => {
                Err(ControllerError::AlreadyInstantiated {
                    name: descriptor.name().to_string(),
                })
            }
            Some(slot) => {
                self.slots[slot] = descriptor;
                Ok(())
            }
            None => {
                self.index
                    .insert(descriptor.name().to_string(), self.slots.len());
                self.slots.push(descriptor);
                Ok(())
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Descriptor<A>> {
        self.index.get(name).map(|&slot| &self.slots[slot])
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.slots.iter().map(|d| d.name().to_string()).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Remove every instantiated descriptor, in registration order.
    /// Descriptors that were never instantiated stay registered.
    pub(crate) fn drain_instantiated(&mut self) -> Vec<Descriptor<A>> {
        let (drained, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.slots)
            .into_iter()
            .partition(|descriptor| descriptor.instance().is_some());
        self.slots = kept;
        self.index = self
            .slots
            .iter()
            .enumerate()
            .map(|(slot, descriptor)| (descriptor.name().to_string(), slot))
            .collect();
        drained
    }
}
