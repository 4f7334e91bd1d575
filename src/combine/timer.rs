//! Manually scheduled request deadline.
//!
//! # Responsibilities
//! - Fire the combined signal with `signal timed out (<ms>ms)` once the
//!   deadline passes
//! - Cancel the pending timer as soon as the combined signal fires for any
//!   other reason
//! - Cancel the pending timer when the request settles, on every exit path
//!
//! # Design Decisions
//! - One Tokio task per armed timer, owned by a drop guard
//! - The guard lives in the request future, so dropping that future also
//!   cancels the timer

use std::time::Duration;

use tokio::task::AbortHandle;

use crate::signal::{AbortReason, AbortSignal};

pub(crate) struct TimerGuard {
    handle: AbortHandle,
}

impl TimerGuard {
    /// Schedule `target` to fire after `timeout_millis`.
    pub(crate) fn arm(target: &AbortSignal, timeout_millis: u64) -> Self {
        let reason = AbortReason::timer_elapsed(timeout_millis);
        let signal = target.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout_millis)).await;
            tracing::debug!(timeout_millis, "Request deadline elapsed");
            signal.trigger(reason);
        });
        let handle = task.abort_handle();

        let disarm = handle.clone();
        target.on_abort(move |_| disarm.abort());

        Self { handle }
    }

    #[cfg(test)]
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
