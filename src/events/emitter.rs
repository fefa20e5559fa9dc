//! Typed publish/subscribe emitter.
//!
//! Delivery is synchronous: `emit` returns only after every handler ran, so
//! observers see lifecycle events in the same order the controller's phases
//! produce them.

use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handler invoked with a reference to the emitted payload.
pub type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

/// Identifies one subscription, returned by [`Emitter::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

struct Subscribers<K, P> {
    next_id: AtomicU64,
    handlers: DashMap<K, Vec<(SubscriptionId, Handler<P>)>>,
}

/// Event emitter keyed by an event kind `K` carrying payloads of type `P`.
///
/// Cloning an emitter shares the subscriber table, so a clone can be moved
/// into a handler that re-publishes events elsewhere.
///
/// # Example
///
/// ```rust
/// use stagehand::events::Emitter;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let emitter: Emitter<&'static str, u32> = Emitter::new();
/// let total = Arc::new(AtomicUsize::new(0));
///
/// let sink = Arc::clone(&total);
/// let id = emitter.on("tick", move |n| {
///     sink.fetch_add(*n as usize, Ordering::SeqCst);
/// });
///
/// assert_eq!(emitter.emit("tick", &3), 1);
/// assert!(emitter.off("tick", id));
/// assert_eq!(emitter.emit("tick", &3), 0);
/// assert_eq!(total.load(Ordering::SeqCst), 3);
/// ```
pub struct Emitter<K, P> {
    inner: Arc<Subscribers<K, P>>,
}

impl<K, P> Emitter<K, P>
where
    K: Copy + Eq + Hash,
{
    /// Create an emitter with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Subscribers {
                next_id: AtomicU64::new(1),
                handlers: DashMap::new(),
            }),
        }
    }

    /// Subscribe `handler` to events of `kind`.
    pub fn on<F>(&self, kind: K, handler: F) -> SubscriptionId
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn off(&self, kind: K, id: SubscriptionId) -> bool {
        let removed = match self.inner.handlers.get_mut(&kind) {
            Some(mut list) => {
                let before = list.len();
                list.retain(|(existing, _)| *existing != id);
                list.len() != before
            }
            None => return false,
        };
        self.inner
            .handlers
            .remove_if(&kind, |_, list| list.is_empty());
        removed
    }

    /// Deliver `payload` to every handler subscribed to `kind`, in
    /// subscription order. Returns the number of handlers invoked.
    ///
    /// Handlers run from a snapshot, after the map entry is released, so
    /// they may call `on`/`off`.
    pub fn emit(&self, kind: K, payload: &P) -> usize {
        let snapshot: Vec<Handler<P>> = match self.inner.handlers.get(&kind) {
            Some(list) => list.iter().map(|(_, handler)| Arc::clone(handler)).collect(),
            None => return 0,
        };
        for handler in &snapshot {
            handler(payload);
        }
        snapshot.len()
    }

    pub fn listener_count(&self, kind: K) -> usize {
        self.inner
            .handlers
            .get(&kind)
            .map_or(0, |list| list.len())
    }

    /// Drop every subscription. The emitter stays usable afterwards.
    pub fn destroy(&self) {
        self.inner.handlers.clear();
    }
}

impl<K, P> Clone for Emitter<K, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, P> Default for Emitter<K, P>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, P> std::fmt::Debug for Emitter<K, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds = self.inner.handlers.len();
        f.debug_struct("Emitter").field("kinds", &kinds).finish()
    }
}
