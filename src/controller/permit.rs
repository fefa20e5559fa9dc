//! Scoped marker for the transition in flight.

use super::error::ControllerError;
use parking_lot::Mutex;

/// Holds the controller's pending-target slot for the lifetime of one
/// `activate` call. Dropping the permit clears the slot, whatever way the
/// pipeline exits.
pub(crate) struct TransitionPermit<'a> {
    slot: &'a Mutex<Option<String>>,
}

impl<'a> TransitionPermit<'a> {
    /// Claim `slot` for `target`, or report the transition already in flight.
    pub(crate) fn acquire(
        slot: &'a Mutex<Option<String>>,
        target: &str,
    ) -> Result<Self, ControllerError> {
        let mut pending = slot.lock();
        if let Some(in_flight) = pending.as_ref() {
            return Err(ControllerError::ConcurrentTransition {
                pending: in_flight.clone(),
            });
        }
        *pending = Some(target.to_string());
        Ok(Self { slot })
    }
}

impl Drop for TransitionPermit<'_> {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}
