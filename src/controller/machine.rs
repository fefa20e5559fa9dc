//! Controller that drives guarded, asynchronous transitions between lazily
//! constructed states.

use super::config::ControllerConfig;
use super::error::{ControllerError, Phase};
use super::permit::TransitionPermit;
use super::registry::{shared_factory, Descriptor, Instance, Registry};
use crate::core::{
    Guard, ManagedState, SharedState, StateError, StateHandle, TransitionHistory,
    TransitionRecord, TransitionTable,
};
use crate::events::{ControllerEvent, Emitter, StateSignal, SubscriptionId};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;

/// Registry, current state and history; only ever touched under one lock
/// that is never held across an await point.
struct Slots<A: Send + Sync + 'static> {
    registry: Registry<A>,
    current: Option<String>,
    /// `false` once the current state was deactivated by a transition whose
    /// target then failed to activate.
    current_active: bool,
    history: TransitionHistory,
    /// Bumped by `destroy`; a transition that started under an older value
    /// is abandoned at its next checkpoint.
    generation: u64,
}

/// Snapshot taken by validation, consumed by the later phases.
struct TransitionPlan<A: Send + Sync + 'static> {
    generation: u64,
    previous: Option<String>,
    outgoing: Option<StateHandle<A>>,
    entry_guard: Option<Guard<A>>,
    existing: Option<SharedState<A>>,
}

/// Guarded asynchronous state controller.
///
/// Owns a registry of named states, each built lazily by its factory on
/// first activation, and moves between them with
/// [`activate`](Controller::activate). `A` is the activation argument type.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use stagehand::core::{ManagedState, StateError, TransitionTable};
/// use stagehand::events::{ControllerEvent, StateSignals};
/// use stagehand::Controller;
///
/// #[derive(Default)]
/// struct Screen {
///     signals: StateSignals,
/// }
///
/// #[async_trait]
/// impl ManagedState for Screen {
///     async fn activate(&self, _args: &()) -> Result<(), StateError> {
///         Ok(())
///     }
///
///     fn signals(&self) -> &StateSignals {
///         &self.signals
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let controller: Controller = Controller::new(TransitionTable::new());
/// controller.add("menu", Screen::default, None).unwrap();
/// controller.add("game", Screen::default, None).unwrap();
///
/// controller.on(ControllerEvent::StateActivated, |handle| {
///     println!("now in {}", handle.name());
/// });
///
/// controller.activate("menu", ()).await.unwrap();
/// controller.activate("game", ()).await.unwrap();
/// assert_eq!(controller.current().as_deref(), Some("game"));
///
/// controller.destroy();
/// # });
/// ```
pub struct Controller<A: Send + Sync + 'static = ()> {
    table: TransitionTable,
    config: ControllerConfig,
    slots: Mutex<Slots<A>>,
    pending: Mutex<Option<String>>,
    events: Emitter<ControllerEvent, StateHandle<A>>,
}

impl<A> Controller<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a controller enforcing `table`, with default configuration.
    pub fn new(table: TransitionTable) -> Self {
        Self::with_config(table, ControllerConfig::default())
    }

    pub fn with_config(table: TransitionTable, config: ControllerConfig) -> Self {
        Self {
            table,
            config,
            slots: Mutex::new(Slots {
                registry: Registry::new(),
                current: None,
                current_active: false,
                history: TransitionHistory::new(),
                generation: 0,
            }),
            pending: Mutex::new(None),
            events: Emitter::new(),
        }
    }

    /// Register a state under `name`.
    ///
    /// The factory runs on the first activation of `name`, never here.
    /// Re-adding a name replaces its definition until the state has been
    /// instantiated; after that it fails with
    /// [`ControllerError::AlreadyInstantiated`].
    pub fn add<S, F>(
        &self,
        name: impl Into<String>,
        factory: F,
        entry_guard: Option<Guard<A>>,
    ) -> Result<(), ControllerError>
    where
        S: ManagedState<A> + 'static,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.register(Descriptor::new(name, shared_factory(factory), entry_guard))
    }

    pub(crate) fn register(&self, descriptor: Descriptor<A>) -> Result<(), ControllerError> {
        tracing::trace!(state = %descriptor.name(), "registering state");
        self.slots.lock().registry.insert(descriptor)
    }

    /// Transition to `next`, forwarding `args` to its entry guard and to its
    /// `activate`.
    ///
    /// Phases run strictly in order: validation, the current state's
    /// `can_deactivate`, the entry guard (and the target's own
    /// `can_activate` once it exists), the current state's `deactivate`,
    /// lazy construction and `activate` of the target. Any failure aborts
    /// the remaining phases and is returned as is; the controller is idle
    /// again either way.
    ///
    /// If [`destroy`](Controller::destroy) runs while a phase is awaited, the
    /// transition stops at the next checkpoint with
    /// [`ControllerError::Destroyed`] and touches nothing else.
    #[tracing::instrument(level = "debug", skip(self, args))]
    pub async fn activate(&self, next: &str, args: A) -> Result<(), ControllerError> {
        let _permit = TransitionPermit::acquire(&self.pending, next)?;
        let plan = self.plan(next)?;

        if let Some(outgoing) = &plan.outgoing {
            self.ensure_can_deactivate(outgoing, next).await?;
            self.ensure_live(plan.generation, next)?;
        }
        self.ensure_can_activate(&plan, next, &args).await?;

        if let Some(outgoing) = &plan.outgoing {
            self.deactivate(outgoing, next, plan.generation).await?;
        }

        let incoming = self.instantiate(next, plan.generation)?;
        self.enter(&incoming, &plan, &args).await
    }

    /// Fail with [`ControllerError::Destroyed`] if `destroy` ran since the
    /// transition was planned.
    fn ensure_live(&self, generation: u64, next: &str) -> Result<(), ControllerError> {
        live(&*self.slots.lock(), generation, next)
    }

    /// Validation phase: the target exists and the table allows the edge.
    fn plan(&self, next: &str) -> Result<TransitionPlan<A>, ControllerError> {
        let slots = self.slots.lock();
        let target = slots
            .registry
            .get(next)
            .ok_or_else(|| ControllerError::UnknownState {
                name: next.to_string(),
            })?;

        let previous = slots.current.clone();
        if !self.table.permits(previous.as_deref(), next) {
            return Err(ControllerError::IllegalTransition {
                from: previous,
                to: next.to_string(),
            });
        }

        let outgoing = previous
            .as_deref()
            .filter(|_| slots.current_active)
            .and_then(|name| slots.registry.get(name))
            .and_then(Descriptor::handle);

        Ok(TransitionPlan {
            generation: slots.generation,
            previous,
            outgoing,
            entry_guard: target.entry_guard().cloned(),
            existing: target.instance().map(|instance| Arc::clone(&instance.state)),
        })
    }

    async fn ensure_can_deactivate(
        &self,
        outgoing: &StateHandle<A>,
        next: &str,
    ) -> Result<(), ControllerError> {
        tracing::trace!(state = %outgoing.name(), "checking can-deactivate");
        let verdict = self
            .bounded(
                Phase::CanDeactivate,
                outgoing.name(),
                outgoing.state().can_deactivate(next),
            )
            .await?;
        judge(Phase::CanDeactivate, outgoing.name(), next, verdict)
    }

    async fn ensure_can_activate(
        &self,
        plan: &TransitionPlan<A>,
        next: &str,
        args: &A,
    ) -> Result<(), ControllerError> {
        if let Some(guard) = &plan.entry_guard {
            tracing::trace!("checking entry guard");
            let verdict = self
                .bounded(Phase::CanActivate, next, guard.check(args))
                .await?;
            judge(Phase::CanActivate, next, next, verdict)?;
            self.ensure_live(plan.generation, next)?;
        }
        if let Some(state) = &plan.existing {
            let verdict = self
                .bounded(Phase::CanActivate, next, state.can_activate(args))
                .await?;
            judge(Phase::CanActivate, next, next, verdict)?;
            self.ensure_live(plan.generation, next)?;
        }
        Ok(())
    }

    async fn deactivate(
        &self,
        outgoing: &StateHandle<A>,
        next: &str,
        generation: u64,
    ) -> Result<(), ControllerError> {
        tracing::debug!(state = %outgoing.name(), "deactivating");
        self.bounded(
            Phase::Deactivate,
            outgoing.name(),
            outgoing.state().deactivate(next),
        )
        .await?
        .map_err(|source| ControllerError::StateFailed {
            phase: Phase::Deactivate,
            state: outgoing.name().to_string(),
            source,
        })?;

        {
            let mut slots = self.slots.lock();
            live(&*slots, generation, next)?;
            slots.current_active = false;
        }
        self.events.emit(ControllerEvent::StateDeactivated, outgoing);
        Ok(())
    }

    /// Return the instance for `name`, building it on first use.
    fn instantiate(&self, name: &str, generation: u64) -> Result<StateHandle<A>, ControllerError> {
        let factory = {
            let slots = self.slots.lock();
            live(&*slots, generation, name)?;
            let descriptor = slots
                .registry
                .get(name)
                .ok_or_else(|| ControllerError::UnknownState {
                    name: name.to_string(),
                })?;
            if let Some(handle) = descriptor.handle() {
                return Ok(handle);
            }
            descriptor.factory()
        };

        let state = factory();
        let done = self.forward_done(name, &state);

        if let Err(err) = self.install(name, &state, done, generation) {
            state.signals().off(StateSignal::Done, done);
            return Err(err);
        }

        tracing::debug!(state = %name, "state created");
        let handle = StateHandle::new(name, state);
        self.events.emit(ControllerEvent::StateCreated, &handle);
        Ok(handle)
    }

    /// Store a freshly built instance in its descriptor.
    fn install(
        &self,
        name: &str,
        state: &SharedState<A>,
        done: SubscriptionId,
        generation: u64,
    ) -> Result<(), ControllerError> {
        let slots = self.slots.lock();
        live(&*slots, generation, name)?;
        let descriptor = slots
            .registry
            .get(name)
            .ok_or_else(|| ControllerError::UnknownState {
                name: name.to_string(),
            })?;
        descriptor
            .set_instance(Instance {
                state: Arc::clone(state),
                done,
            })
            .map_err(|_| ControllerError::AlreadyInstantiated {
                name: name.to_string(),
            })
    }

    /// Re-publish the state's done signal as [`ControllerEvent::StateDone`].
    fn forward_done(&self, name: &str, state: &SharedState<A>) -> SubscriptionId {
        let events = self.events.clone();
        let name = name.to_string();
        let weak = Arc::downgrade(state);
        state.signals().on(StateSignal::Done, move |_| {
            if let Some(state) = weak.upgrade() {
                events.emit(ControllerEvent::StateDone, &StateHandle::new(name.clone(), state));
            }
        })
    }

    async fn enter(
        &self,
        incoming: &StateHandle<A>,
        plan: &TransitionPlan<A>,
        args: &A,
    ) -> Result<(), ControllerError> {
        tracing::debug!(state = %incoming.name(), "activating");
        self.bounded(
            Phase::Activate,
            incoming.name(),
            incoming.state().activate(args),
        )
        .await?
        .map_err(|source| ControllerError::StateFailed {
            phase: Phase::Activate,
            state: incoming.name().to_string(),
            source,
        })?;

        {
            let mut slots = self.slots.lock();
            live(&*slots, plan.generation, incoming.name())?;
            if !slots.registry.contains(incoming.name()) {
                return Err(ControllerError::UnknownState {
                    name: incoming.name().to_string(),
                });
            }
            slots.current = Some(incoming.name().to_string());
            slots.current_active = true;
            slots.history.push_bounded(
                TransitionRecord::now(plan.previous.as_deref(), incoming.name()),
                self.config.history_limit,
            );
        }

        self.events.emit(ControllerEvent::StateActivated, incoming);
        Ok(())
    }

    /// Await `work`, bounded by the configured phase timeout.
    async fn bounded<T>(
        &self,
        phase: Phase,
        state: &str,
        work: impl Future<Output = T>,
    ) -> Result<T, ControllerError> {
        match self.config.phase_timeout {
            Some(limit) => tokio::time::timeout(limit, work).await.map_err(|_| {
                ControllerError::PhaseTimedOut {
                    phase,
                    state: state.to_string(),
                    limit,
                }
            }),
            None => Ok(work.await),
        }
    }

    /// Tear down every instantiated state and close the event sink.
    ///
    /// Each instance gets its done subscription removed and one
    /// [`ControllerEvent::Destroy`] event. A transition in flight is
    /// abandoned at its next checkpoint. Calling `destroy` again is a no-op.
    pub fn destroy(&self) {
        let torn_down = {
            let mut slots = self.slots.lock();
            slots.generation = slots.generation.wrapping_add(1);
            slots.current = None;
            slots.current_active = false;
            slots.registry.drain_instantiated()
        };

        let count = torn_down.len();
        for descriptor in torn_down {
            let name = descriptor.name().to_string();
            if let Some(instance) = descriptor.into_instance() {
                instance.state.signals().off(StateSignal::Done, instance.done);
                self.events
                    .emit(ControllerEvent::Destroy, &StateHandle::new(name, instance.state));
            }
        }
        self.events.destroy();

        if count > 0 {
            tracing::debug!(states = count, "controller destroyed");
        }
    }

    /// Subscribe to a controller event.
    pub fn on<F>(&self, event: ControllerEvent, handler: F) -> SubscriptionId
    where
        F: Fn(&StateHandle<A>) + Send + Sync + 'static,
    {
        self.events.on(event, handler)
    }

    /// Remove a subscription made with [`on`](Controller::on).
    pub fn off(&self, event: ControllerEvent, id: SubscriptionId) -> bool {
        self.events.off(event, id)
    }

    /// Name of the current state.
    pub fn current(&self) -> Option<String> {
        self.slots.lock().current.clone()
    }

    /// Handle to the current state instance.
    pub fn current_state(&self) -> Option<StateHandle<A>> {
        let slots = self.slots.lock();
        slots
            .current
            .as_deref()
            .and_then(|name| slots.registry.get(name))
            .and_then(Descriptor::handle)
    }

    /// Whether the current state is live. `false` when the last transition
    /// deactivated it and then failed to activate its target; the next
    /// transition skips its leave phases.
    pub fn is_current_active(&self) -> bool {
        let slots = self.slots.lock();
        slots.current.is_some() && slots.current_active
    }

    /// Target of the transition in flight, if any.
    pub fn pending(&self) -> Option<String> {
        self.pending.lock().clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.lock().registry.contains(name)
    }

    pub fn is_instantiated(&self, name: &str) -> bool {
        self.state(name).is_some()
    }

    /// Handle to the instance registered as `name`, if it has been built.
    pub fn state(&self, name: &str) -> Option<StateHandle<A>> {
        self.slots
            .lock()
            .registry
            .get(name)
            .and_then(Descriptor::handle)
    }

    /// Registered state names, in registration order.
    pub fn state_names(&self) -> Vec<String> {
        self.slots.lock().registry.names()
    }

    /// Completed transitions, oldest first.
    pub fn history(&self) -> TransitionHistory {
        self.slots.lock().history.clone()
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }
}

impl<A: Send + Sync + 'static> std::fmt::Debug for Controller<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock();
        f.debug_struct("Controller")
            .field("states", &slots.registry.names())
            .field("current", &slots.current)
            .field("pending", &*self.pending.lock())
            .finish_non_exhaustive()
    }
}

fn live<A: Send + Sync + 'static>(
    slots: &Slots<A>,
    generation: u64,
    target: &str,
) -> Result<(), ControllerError> {
    if slots.generation == generation {
        Ok(())
    } else {
        Err(ControllerError::Destroyed {
            target: target.to_string(),
        })
    }
}

/// Turn a guard verdict into a pipeline outcome.
fn judge(
    phase: Phase,
    state: &str,
    target: &str,
    verdict: Result<bool, StateError>,
) -> Result<(), ControllerError> {
    match verdict {
        Ok(true) => Ok(()),
        Ok(false) => Err(ControllerError::GuardRejected {
            phase,
            state: state.to_string(),
            target: target.to_string(),
        }),
        Err(source) => Err(ControllerError::GuardFailed {
            phase,
            state: state.to_string(),
            source,
        }),
    }
}
