//! Event kinds published by controllers and managed states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle events published by a [`Controller`](crate::Controller).
///
/// Every event carries a [`StateHandle`](crate::StateHandle) for the state it
/// concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControllerEvent {
    /// A state instance was constructed by its factory
    StateCreated,
    /// A state finished activating and became current
    StateActivated,
    /// The outgoing state finished deactivating
    StateDeactivated,
    /// A state signalled that it considers itself done
    StateDone,
    /// A state instance was torn down by `destroy`
    Destroy,
}

impl ControllerEvent {
    pub const ALL: [ControllerEvent; 5] = [
        Self::StateCreated,
        Self::StateActivated,
        Self::StateDeactivated,
        Self::StateDone,
        Self::Destroy,
    ];

    /// Wire name of the event, e.g. `state-activated`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StateCreated => "state-created",
            Self::StateActivated => "state-activated",
            Self::StateDeactivated => "state-deactivated",
            Self::StateDone => "state-done",
            Self::Destroy => "destroy",
        }
    }

    /// Look up an event by its wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.as_str() == name)
    }
}

impl fmt::Display for ControllerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals a managed state publishes on its own emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateSignal {
    /// The state considers its work finished
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_lookup() {
        for event in ControllerEvent::ALL {
            assert_eq!(ControllerEvent::from_name(event.as_str()), Some(event));
        }
        assert_eq!(ControllerEvent::from_name("state-exploded"), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&ControllerEvent::StateDeactivated).unwrap();
        assert_eq!(json, "\"state-deactivated\"");

        let parsed: ControllerEvent = serde_json::from_str("\"state-done\"").unwrap();
        assert_eq!(parsed, ControllerEvent::StateDone);
    }

    #[test]
    fn display_matches_wire_name() {
        assert_eq!(ControllerEvent::Destroy.to_string(), "destroy");
        assert_eq!(ControllerEvent::StateCreated.to_string(), "state-created");
    }
}
