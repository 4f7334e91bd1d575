//! One-shot abort signals and the controllers that fire them.
//!
//! # Responsibilities
//! - Hold the fired state and reason of a signal
//! - Register and remove abort listeners
//! - Run listeners exactly once, outside the signal's lock
//! - Let async code wait for the signal to fire
//!
//! # Design Decisions
//! - First abort wins; later aborts are ignored and never panic
//! - Listeners registered after the signal fired are rejected, not invoked
//! - Waiters are woken through a `CancellationToken`, listeners through callbacks

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tokio::task::AbortHandle;
use tokio_util::sync::CancellationToken;

use crate::signal::reason::AbortReason;

type Listener = Box<dyn FnOnce(&AbortReason) + Send>;

/// Handle returned when a listener is registered, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Default)]
struct State {
    reason: Option<AbortReason>,
    // Keyed by a monotonic id, so iteration order is registration order.
    listeners: BTreeMap<u64, Listener>,
    next_id: u64,
}

pub(super) struct Inner {
    state: Mutex<State>,
    fired: CancellationToken,
    /// Self-firing timer owned by this signal, if any.
    pub(super) timer: OnceLock<AbortHandle>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.get() {
            timer.abort();
        }
    }
}

/// A cloneable view of a one-shot cancellation state.
///
/// Clones share the same state: aborting through the owning
/// [`AbortController`] is observed by every clone.
#[derive(Clone)]
pub struct AbortSignal {
    pub(super) inner: Arc<Inner>,
}

impl AbortSignal {
    pub(super) fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                fired: CancellationToken::new(),
                timer: OnceLock::new(),
            }),
        }
    }

    pub(super) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }

    pub(super) fn upgrade(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the signal has fired.
    pub fn is_aborted(&self) -> bool {
        self.state().reason.is_some()
    }

    /// The reason the signal fired with, once it has fired.
    pub fn reason(&self) -> Option<AbortReason> {
        self.state().reason.clone()
    }

    /// Number of listeners currently waiting on this signal.
    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    /// Whether both handles refer to the same underlying signal.
    pub fn ptr_eq(&self, other: &AbortSignal) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register a callback to run once when the signal fires.
    ///
    /// Returns `None` without registering if the signal has already fired.
    pub fn on_abort<F>(&self, listener: F) -> Option<ListenerId>
    where
        F: FnOnce(&AbortReason) + Send + 'static,
    {
        let mut state = self.state();
        if state.reason.is_some() {
            return None;
        }
        let id = state.next_id;
        state.next_id += 1;
        state.listeners.insert(id, Box::new(listener));
        Some(ListenerId(id))
    }

    /// Register a callback whose registration lives only as long as `scope`
    /// has not fired.
    ///
    /// When `scope` fires, the callback is removed from this signal without
    /// running. Returns `None` if either signal has already fired.
    pub fn on_abort_scoped<F>(&self, listener: F, scope: &AbortSignal) -> Option<ListenerId>
    where
        F: FnOnce(&AbortReason) + Send + 'static,
    {
        if scope.is_aborted() {
            return None;
        }
        let id = self.on_abort(listener)?;

        let source = self.downgrade();
        let remover = scope.on_abort(move |_| {
            if let Some(source) = AbortSignal::upgrade(&source) {
                source.remove_listener(id);
            }
        });

        // Scope fired between the two registrations.
        if remover.is_none() {
            self.remove_listener(id);
            return None;
        }
        Some(id)
    }

    /// Remove a previously registered listener. Returns whether it was still present.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.state().listeners.remove(&id.0);
        removed.is_some()
    }

    /// Wait until the signal fires and return its reason.
    pub async fn aborted(&self) -> AbortReason {
        self.inner.fired.cancelled().await;
        self.reason().unwrap_or_default()
    }

    /// Fire the signal. Returns `false` if it had already fired.
    pub(crate) fn trigger(&self, reason: AbortReason) -> bool {
        let listeners = {
            let mut state = self.state();
            if state.reason.is_some() {
                return false;
            }
            state.reason = Some(reason.clone());
            std::mem::take(&mut state.listeners)
        };

        self.inner.fired.cancel();
        for (_, listener) in listeners {
            listener(&reason);
        }
        true
    }
}

impl fmt::Debug for AbortSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("AbortSignal")
            .field("reason", &state.reason)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

/// Owner of an [`AbortSignal`]; the only way to fire it from outside the crate.
#[derive(Debug)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self {
            signal: AbortSignal::new(),
        }
    }

    /// A handle to the controlled signal.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fire the signal with `reason`. Returns `false` if it had already fired,
    /// in which case the first reason is kept.
    pub fn abort(&self, reason: AbortReason) -> bool {
        self.signal.trigger(reason)
    }

    /// Fire the signal with the generic `AbortError` reason.
    pub fn abort_default(&self) -> bool {
        self.abort(AbortReason::aborted())
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}
