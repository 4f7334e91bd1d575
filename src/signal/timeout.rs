//! Self-firing signals.
//!
//! The timer task holds only a weak reference to its signal and is aborted
//! when the last handle to the signal is dropped, so an abandoned timeout
//! signal never keeps a task alive.

use std::time::Duration;

use crate::signal::abort::AbortSignal;
use crate::signal::reason::AbortReason;

impl AbortSignal {
    /// A signal that fires by itself after `duration` with a
    /// `TimeoutError` reason.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn timeout(duration: Duration) -> Self {
        Self::after(duration, AbortReason::timed_out())
    }

    /// A signal that fires by itself after `duration` with `reason`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn after(duration: Duration, reason: AbortReason) -> Self {
        let signal = AbortSignal::new();
        let weak = signal.downgrade();

        let task = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(signal) = AbortSignal::upgrade(&weak) {
                signal.trigger(reason);
            }
        });
        // Freshly created, so the cell is always empty here.
        let _ = signal.inner.timer.set(task.abort_handle());

        signal
    }
}
