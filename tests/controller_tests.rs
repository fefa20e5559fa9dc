//! Scenario tests for the transition pipeline.

use async_trait::async_trait;
use parking_lot::Mutex;
use stagehand::core::{Guard, ManagedState, StateError, TransitionTable};
use stagehand::events::{ControllerEvent, StateSignal, StateSignals};
use stagehand::controller::DEFAULT_HISTORY_LIMIT;
use stagehand::{transition_table, Controller, ControllerConfig, ControllerError, Phase};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use stillwater::prelude::*;
use tokio::sync::Notify;

type Log = Arc<Mutex<Vec<String>>>;

/// Knobs a test flips to make a scripted state misbehave.
#[derive(Default)]
struct Behaviour {
    refuse_leave: AtomicBool,
    refuse_enter: AtomicBool,
    fail_activate: AtomicBool,
    fail_deactivate: AtomicBool,
    hang_leave: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
    leave_gate: Mutex<Option<Arc<Notify>>>,
}

struct Scripted {
    name: &'static str,
    log: Log,
    behaviour: Arc<Behaviour>,
    signals: StateSignals,
}

#[async_trait]
impl ManagedState for Scripted {
    async fn activate(&self, _args: &()) -> Result<(), StateError> {
        let gate = self.behaviour.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.log.lock().push(format!("{}.activate", self.name));
        if self.behaviour.fail_activate.load(Ordering::SeqCst) {
            return Err("activation exploded".into());
        }
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }

    async fn can_activate(&self, _args: &()) -> Result<bool, StateError> {
        Ok(!self.behaviour.refuse_enter.load(Ordering::SeqCst))
    }

    async fn can_deactivate(&self, _next: &str) -> Result<bool, StateError> {
        let gate = self.behaviour.leave_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.behaviour.hang_leave.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(!self.behaviour.refuse_leave.load(Ordering::SeqCst))
    }

    async fn deactivate(&self, next: &str) -> Result<(), StateError> {
        self.log.lock().push(format!("{}.deactivate({next})", self.name));
        if self.behaviour.fail_deactivate.load(Ordering::SeqCst) {
            return Err("deactivation exploded".into());
        }
        Ok(())
    }
}

struct Harness {
    controller: Controller,
    log: Log,
    events: Arc<Mutex<Vec<(ControllerEvent, String)>>>,
    built: Arc<Mutex<HashMap<&'static str, usize>>>,
}

impl Harness {
    fn new(table: TransitionTable) -> Self {
        Self::with_config(table, ControllerConfig::default())
    }

    fn with_config(table: TransitionTable, config: ControllerConfig) -> Self {
        let controller = Controller::with_config(table, config);
        let events = Arc::new(Mutex::new(Vec::new()));
        for event in ControllerEvent::ALL {
            let sink = Arc::clone(&events);
            controller.on(event, move |handle| {
                sink.lock().push((event, handle.name().to_string()));
            });
        }
        Self {
            controller,
            log: Arc::new(Mutex::new(Vec::new())),
            events,
            built: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn add(&self, name: &'static str, guard: Option<Guard<()>>) -> Arc<Behaviour> {
        let behaviour = Arc::new(Behaviour::default());
        let log = Arc::clone(&self.log);
        let built = Arc::clone(&self.built);
        let shared = Arc::clone(&behaviour);
        self.controller
            .add(
                name,
                move || {
                    *built.lock().entry(name).or_default() += 1;
                    Scripted {
                        name,
                        log: Arc::clone(&log),
                        behaviour: Arc::clone(&shared),
                        signals: StateSignals::new(),
                    }
                },
                guard,
            )
            .unwrap();
        behaviour
    }

    fn events(&self) -> Vec<(ControllerEvent, String)> {
        self.events.lock().clone()
    }

    fn clear_events(&self) {
        self.events.lock().clear();
    }

    fn built(&self, name: &str) -> usize {
        self.built.lock().get(name).copied().unwrap_or(0)
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

fn ev(event: ControllerEvent, name: &str) -> (ControllerEvent, String) {
    (event, name.to_string())
}

#[tokio::test]
async fn events_follow_phase_order() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();
    assert_eq!(
        h.events(),
        vec![
            ev(ControllerEvent::StateCreated, "A"),
            ev(ControllerEvent::StateActivated, "A"),
        ]
    );

    h.clear_events();
    h.controller.activate("B", ()).await.unwrap();
    assert_eq!(
        h.events(),
        vec![
            ev(ControllerEvent::StateDeactivated, "A"),
            ev(ControllerEvent::StateCreated, "B"),
            ev(ControllerEvent::StateActivated, "B"),
        ]
    );
    assert_eq!(h.log(), vec!["A.activate", "A.deactivate(B)", "B.activate"]);
    assert_eq!(h.controller.current().as_deref(), Some("B"));
}

#[tokio::test]
async fn unknown_state_leaves_current_unset() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);

    let err = h.controller.activate("Z", ()).await.unwrap_err();

    assert!(matches!(err, ControllerError::UnknownState { ref name } if name == "Z"));
    assert!(h.controller.current().is_none());
    assert!(!h.controller.is_transitioning());
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn illegal_transition_keeps_current() {
    let h = Harness::new(transition_table! {
        "B" <= ["C"],
    });
    h.add("A", None);
    h.add("B", None);
    h.add("C", None);

    h.controller.activate("A", ()).await.unwrap();
    let err = h.controller.activate("B", ()).await.unwrap_err();

    match err {
        ControllerError::IllegalTransition { from, to } => {
            assert_eq!(from.as_deref(), Some("A"));
            assert_eq!(to, "B");
        }
        other => panic!("Expected IllegalTransition, got {other:?}"),
    }
    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert_eq!(h.built("B"), 0);
    assert_eq!(h.log(), vec!["A.activate"]);

    h.controller.activate("C", ()).await.unwrap();
    h.controller.activate("B", ()).await.unwrap();
    assert_eq!(h.controller.current().as_deref(), Some("B"));
}

#[tokio::test]
async fn initial_state_is_enforced() {
    let h = Harness::new(transition_table! {
        "A" <= [initial],
    });
    h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();

    let h = Harness::new(transition_table! {
        "B" <= ["A"],
    });
    h.add("A", None);
    h.add("B", None);

    let err = h.controller.activate("B", ()).await.unwrap_err();
    assert!(matches!(err, ControllerError::IllegalTransition { from: None, .. }));
}

#[tokio::test]
async fn entry_guard_rejection_keeps_current() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.add("B", Some(Guard::deny()));

    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::GuardRejected { phase: Phase::CanActivate, ref state, .. } if state == "B"
    ));
    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert!(h.events().is_empty());
    assert_eq!(h.log(), vec!["A.activate"]);
    assert_eq!(h.built("B"), 0);
    assert!(!h.controller.is_transitioning());
}

#[tokio::test]
async fn entry_guard_sees_effect_failure() {
    let h = Harness::new(TransitionTable::new());
    h.add(
        "B",
        Some(Guard::from_effect(|| {
            let error: StateError = "policy service down".into();
            fail(error).boxed()
        })),
    );

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(matches!(err, ControllerError::GuardFailed { phase: Phase::CanActivate, .. }));
    assert!(err.to_string().contains("policy service down"));
    assert!(h.controller.current().is_none());
}

#[tokio::test]
async fn can_deactivate_refusal_blocks_transition() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();
    a.refuse_leave.store(true, Ordering::SeqCst);
    h.clear_events();

    let err = h.controller.activate("B", ()).await.unwrap_err();

    match err {
        ControllerError::GuardRejected {
            phase,
            state,
            target,
        } => {
            assert_eq!(phase, Phase::CanDeactivate);
            assert_eq!(state, "A");
            assert_eq!(target, "B");
        }
        other => panic!("Expected GuardRejected, got {other:?}"),
    }
    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert!(h.events().is_empty());

    a.refuse_leave.store(false, Ordering::SeqCst);
    h.controller.activate("B", ()).await.unwrap();
    assert_eq!(h.controller.current().as_deref(), Some("B"));
}

#[tokio::test]
async fn built_instance_can_refuse_reentry() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    let b = h.add("B", None);

    h.controller.activate("B", ()).await.unwrap();
    h.controller.activate("A", ()).await.unwrap();
    b.refuse_enter.store(true, Ordering::SeqCst);

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(err.is_guard_rejection());
    assert_eq!(h.controller.current().as_deref(), Some("A"));
}

#[tokio::test]
async fn overlapping_activation_is_rejected() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    h.add("B", None);

    let gate = Arc::new(Notify::new());
    *a.gate.lock() = Some(Arc::clone(&gate));

    let controller = &h.controller;
    let (first, (pending, second)) = tokio::join!(controller.activate("A", ()), async {
        while !controller.is_transitioning() {
            tokio::task::yield_now().await;
        }
        let pending = controller.pending();
        let result = controller.activate("B", ()).await;
        gate.notify_one();
        (pending, result)
    });

    assert!(first.is_ok());
    assert_eq!(pending.as_deref(), Some("A"));
    assert!(matches!(
        second,
        Err(ControllerError::ConcurrentTransition { ref pending }) if pending == "A"
    ));
    assert_eq!(h.controller.current().as_deref(), Some("A"));

    *a.gate.lock() = None;
    h.controller.activate("B", ()).await.unwrap();
    assert_eq!(h.controller.current().as_deref(), Some("B"));
}

#[tokio::test]
async fn activation_error_returns_controller_to_idle() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    let b = h.add("B", None);
    b.fail_activate.store(true, Ordering::SeqCst);

    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::StateFailed { phase: Phase::Activate, ref state, .. } if state == "B"
    ));
    assert!(!h.controller.is_transitioning());
    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert!(!h.controller.is_current_active());
    assert_eq!(
        h.events(),
        vec![
            ev(ControllerEvent::StateDeactivated, "A"),
            ev(ControllerEvent::StateCreated, "B"),
        ]
    );

    h.clear_events();
    b.fail_activate.store(false, Ordering::SeqCst);
    h.controller.activate("B", ()).await.unwrap();

    assert_eq!(h.controller.current().as_deref(), Some("B"));
    assert!(h.controller.is_current_active());
    assert_eq!(h.built("B"), 1);
    assert_eq!(h.events(), vec![ev(ControllerEvent::StateActivated, "B")]);
    let leaves = h.log().iter().filter(|line| line.starts_with("A.deactivate")).count();
    assert_eq!(leaves, 1);
}

#[tokio::test]
async fn deactivated_current_is_not_asked_to_leave_again() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    let b = h.add("B", None);
    b.fail_activate.store(true, Ordering::SeqCst);

    h.controller.activate("A", ()).await.unwrap();
    assert!(h.controller.activate("B", ()).await.is_err());

    // Refusing to leave no longer matters: A was already left.
    a.refuse_leave.store(true, Ordering::SeqCst);
    h.controller.activate("A", ()).await.unwrap();

    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert!(h.controller.is_current_active());
    assert_eq!(h.log(), vec!["A.activate", "A.deactivate(B)", "B.activate", "A.activate"]);
}

#[tokio::test]
async fn deactivation_error_stops_before_activation() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    h.add("B", None);
    a.fail_deactivate.store(true, Ordering::SeqCst);

    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(matches!(err, ControllerError::StateFailed { phase: Phase::Deactivate, .. }));
    assert!(h.events().is_empty());
    assert_eq!(h.built("B"), 0);
    assert_eq!(h.controller.current().as_deref(), Some("A"));
    assert!(!h.controller.is_transitioning());
}

#[tokio::test]
async fn validation_failure_releases_reentrancy_marker() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);

    assert!(h.controller.activate("missing", ()).await.is_err());
    assert!(h.controller.pending().is_none());

    h.controller.activate("A", ()).await.unwrap();
}

#[tokio::test]
async fn states_are_constructed_once() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.add("B", None);

    for name in ["A", "B", "A", "B", "A"] {
        h.controller.activate(name, ()).await.unwrap();
    }

    assert_eq!(h.built("A"), 1);
    assert_eq!(h.built("B"), 1);
    let created = h
        .events()
        .into_iter()
        .filter(|(event, _)| *event == ControllerEvent::StateCreated)
        .count();
    assert_eq!(created, 2);
}

#[tokio::test]
async fn reactivating_current_state_cycles_it() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);

    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();
    h.controller.activate("A", ()).await.unwrap();

    assert_eq!(
        h.events(),
        vec![
            ev(ControllerEvent::StateDeactivated, "A"),
            ev(ControllerEvent::StateActivated, "A"),
        ]
    );
    assert_eq!(h.built("A"), 1);
}

#[tokio::test]
async fn done_signal_is_republished() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let a = h.controller.state("A").unwrap();
    a.state().signals().emit(StateSignal::Done, &());

    assert_eq!(h.events(), vec![ev(ControllerEvent::StateDone, "A")]);
}

#[tokio::test]
async fn event_payload_is_the_live_instance() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);

    let created = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&created);
    h.controller.on(ControllerEvent::StateCreated, move |handle| {
        *slot.lock() = Some(handle.clone());
    });

    h.controller.activate("A", ()).await.unwrap();

    let created = created.lock().clone().unwrap();
    let current = h.controller.current_state().unwrap();
    assert!(created.is(current.state()));
    assert_eq!(current.name(), "A");
}

#[tokio::test]
async fn destroy_emits_once_and_is_idempotent() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();
    let a = h.controller.state("A").unwrap();
    h.clear_events();

    let destroyed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&destroyed);
    h.controller.on(ControllerEvent::Destroy, move |handle| {
        sink.lock().push(handle.clone());
    });

    h.controller.destroy();

    assert_eq!(h.events(), vec![ev(ControllerEvent::Destroy, "A")]);
    {
        let destroyed = destroyed.lock();
        assert_eq!(destroyed.len(), 1);
        assert!(destroyed[0].is(a.state()));
    }
    assert!(h.controller.current().is_none());
    assert!(!h.controller.contains("A"));
    assert!(h.controller.contains("B"));
    assert_eq!(a.state().signals().listener_count(StateSignal::Done), 0);

    h.controller.destroy();
    assert_eq!(h.events().len(), 1);
    assert_eq!(destroyed.lock().len(), 1);
}

#[tokio::test]
async fn destroy_during_leave_guard_abandons_transition() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    h.add("B", None);
    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let gate = Arc::new(Notify::new());
    *a.leave_gate.lock() = Some(Arc::clone(&gate));

    let late = Arc::new(Mutex::new(Vec::new()));
    let controller = &h.controller;
    let (result, ()) = tokio::join!(controller.activate("B", ()), async {
        while !controller.is_transitioning() {
            tokio::task::yield_now().await;
        }
        controller.destroy();
        for event in ControllerEvent::ALL {
            let sink = Arc::clone(&late);
            controller.on(event, move |handle| {
                sink.lock().push((event, handle.name().to_string()));
            });
        }
        gate.notify_one();
    });

    assert!(matches!(
        result,
        Err(ControllerError::Destroyed { ref target }) if target == "B"
    ));
    assert_eq!(h.events(), vec![ev(ControllerEvent::Destroy, "A")]);
    assert!(late.lock().is_empty());
    assert_eq!(h.log(), vec!["A.activate"]);
    assert_eq!(h.built("B"), 0);
    assert!(h.controller.current().is_none());
    assert!(!h.controller.is_instantiated("B"));
    assert!(!h.controller.is_transitioning());
}

#[tokio::test]
async fn destroy_during_activation_leaves_nothing_current() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    let b = h.add("B", None);
    h.controller.activate("A", ()).await.unwrap();
    h.clear_events();

    let gate = Arc::new(Notify::new());
    *b.gate.lock() = Some(Arc::clone(&gate));

    let controller = &h.controller;
    let (result, ()) = tokio::join!(controller.activate("B", ()), async {
        while !controller.is_instantiated("B") {
            tokio::task::yield_now().await;
        }
        controller.destroy();
        gate.notify_one();
    });

    assert!(matches!(result, Err(ControllerError::Destroyed { .. })));
    assert_eq!(
        h.events(),
        vec![
            ev(ControllerEvent::StateDeactivated, "A"),
            ev(ControllerEvent::StateCreated, "B"),
            ev(ControllerEvent::Destroy, "A"),
            ev(ControllerEvent::Destroy, "B"),
        ]
    );
    assert!(h.controller.current().is_none());
    assert!(!h.controller.contains("B"));
    assert_eq!(h.controller.history().path(), vec![None, Some("A")]);
    assert!(!h.controller.is_transitioning());
}

#[tokio::test]
async fn done_after_destroy_is_not_forwarded() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.controller.activate("A", ()).await.unwrap();
    let a = h.controller.state("A").unwrap();

    h.controller.destroy();
    h.clear_events();

    assert_eq!(a.state().signals().emit(StateSignal::Done, &()), 0);
    assert!(h.events().is_empty());
}

#[tokio::test]
async fn phase_timeout_fails_hanging_guard() {
    let h = Harness::with_config(
        TransitionTable::new(),
        ControllerConfig::default().with_phase_timeout(Duration::from_millis(20)),
    );
    let a = h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();
    a.hang_leave.store(true, Ordering::SeqCst);

    let err = h.controller.activate("B", ()).await.unwrap_err();

    assert!(matches!(
        err,
        ControllerError::PhaseTimedOut { phase: Phase::CanDeactivate, ref state, .. } if state == "A"
    ));
    assert!(!h.controller.is_transitioning());
    assert_eq!(h.controller.current().as_deref(), Some("A"));
}

#[tokio::test]
async fn hanging_guard_without_timeout_blocks_until_abandoned() {
    let h = Harness::new(TransitionTable::new());
    let a = h.add("A", None);
    h.add("B", None);

    h.controller.activate("A", ()).await.unwrap();
    a.hang_leave.store(true, Ordering::SeqCst);

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), h.controller.activate("B", ())).await;
    assert!(abandoned.is_err());

    // Dropping the in-flight future releases the marker.
    assert!(!h.controller.is_transitioning());
    a.hang_leave.store(false, Ordering::SeqCst);
    h.controller.activate("B", ()).await.unwrap();
}

#[tokio::test]
async fn history_records_completed_transitions() {
    let h = Harness::with_config(
        TransitionTable::new(),
        ControllerConfig::default().with_history_limit(2),
    );
    h.add("A", None);
    h.add("B", Some(Guard::deny()));
    h.add("C", None);

    h.controller.activate("A", ()).await.unwrap();
    assert!(h.controller.activate("B", ()).await.is_err());
    h.controller.activate("C", ()).await.unwrap();
    h.controller.activate("A", ()).await.unwrap();

    let history = h.controller.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.path(), vec![Some("A"), Some("C"), Some("A")]);
}

#[tokio::test]
async fn default_config_keeps_history_bounded() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.add("B", None);

    for step in 0..DEFAULT_HISTORY_LIMIT + 10 {
        let name = if step % 2 == 0 { "A" } else { "B" };
        h.controller.activate(name, ()).await.unwrap();
    }

    let history = h.controller.history();
    assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
    assert_eq!(history.last().map(|r| r.to.as_str()), Some("B"));
}

#[tokio::test]
async fn registration_errors() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);
    h.controller.activate("A", ()).await.unwrap();

    let redefine = h.controller.add("A", StateSignalsOnly::default, None);
    assert!(matches!(
        redefine,
        Err(ControllerError::AlreadyInstantiated { ref name }) if name == "A"
    ));

    let empty = h.controller.add("", StateSignalsOnly::default, None);
    assert!(matches!(empty, Err(ControllerError::EmptyStateName)));
}

#[tokio::test]
async fn unsubscribed_handler_stops_receiving() {
    let h = Harness::new(TransitionTable::new());
    h.add("A", None);

    let seen = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&seen);
    let id = h.controller.on(ControllerEvent::StateActivated, move |_| {
        *sink.lock() += 1;
    });

    h.controller.activate("A", ()).await.unwrap();
    assert!(h.controller.off(ControllerEvent::StateActivated, id));
    h.controller.activate("A", ()).await.unwrap();

    assert_eq!(*seen.lock(), 1);
}

#[derive(Default)]
struct StateSignalsOnly {
    signals: StateSignals,
}

#[async_trait]
impl ManagedState for StateSignalsOnly {
    async fn activate(&self, _args: &()) -> Result<(), StateError> {
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }
}

/// Records the arguments it is activated with.
struct Greeter {
    greeted: Log,
    signals: StateSignals,
}

#[async_trait]
impl ManagedState<String> for Greeter {
    async fn activate(&self, who: &String) -> Result<(), StateError> {
        self.greeted.lock().push(who.clone());
        Ok(())
    }

    fn signals(&self) -> &StateSignals {
        &self.signals
    }
}

#[tokio::test]
async fn arguments_reach_guard_and_state() {
    let controller: Controller<String> = Controller::new(TransitionTable::new());
    let greeted: Log = Arc::default();
    let sink = Arc::clone(&greeted);
    controller
        .add(
            "hello",
            move || Greeter {
                greeted: Arc::clone(&sink),
                signals: StateSignals::new(),
            },
            Some(Guard::new(|who: &String| !who.is_empty())),
        )
        .unwrap();

    let err = controller.activate("hello", String::new()).await.unwrap_err();
    assert!(err.is_guard_rejection());

    controller.activate("hello", "ada".to_string()).await.unwrap();
    controller.activate("hello", "grace".to_string()).await.unwrap();

    assert_eq!(*greeted.lock(), vec!["ada".to_string(), "grace".to_string()]);
    assert_eq!(controller.current_state().unwrap().name(), "hello");
    assert_eq!(controller.history().len(), 2);
}
