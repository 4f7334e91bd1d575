//! Fan-in of many source signals into one per-call signal.
//!
//! # Responsibilities
//! - Fire the combined signal with the reason of the first source to fire
//! - Short-circuit on a source that already fired
//! - Keep listeners on caller signals no longer than the call
//!
//! # Design Decisions
//! - Listeners are scoped to the combined signal, so they unregister as soon
//!   as it fires
//! - Dropping the `CombinedSignal` detaches whatever is still registered,
//!   which covers calls that settle without any abort

use crate::observability::metrics;
use crate::signal::{AbortController, AbortSignal, ListenerId};

pub(crate) struct CombinedSignal {
    controller: AbortController,
    attached: Vec<(AbortSignal, ListenerId)>,
}

impl CombinedSignal {
    pub(crate) fn new() -> Self {
        let controller = AbortController::new();
        controller.signal().on_abort(|reason| {
            tracing::debug!(reason = %reason, "Combined signal fired");
            metrics::record_abort(reason.kind());
        });

        Self {
            controller,
            attached: Vec::new(),
        }
    }

    pub(crate) fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    /// Wire every source to the combined signal, in order.
    ///
    /// Stops at the first source that has already fired, after firing the
    /// combined signal with its reason.
    pub(crate) fn attach_all(&mut self, sources: Vec<AbortSignal>) {
        let combined = self.controller.signal();

        for source in sources {
            if let Some(reason) = source.reason() {
                self.controller.abort(reason);
                break;
            }

            let target = combined.clone();
            let registered = source.on_abort_scoped(
                move |reason| {
                    target.trigger(reason.clone());
                },
                &combined,
            );

            match registered {
                Some(id) => self.attached.push((source, id)),
                None => {
                    // Either the source fired since the check above, or the
                    // combined signal already has.
                    if let Some(reason) = source.reason() {
                        self.controller.abort(reason);
                    }
                    break;
                }
            }
        }

        tracing::trace!(
            attached = self.attached.len(),
            aborted = combined.is_aborted(),
            "Sources attached"
        );
    }
}

impl Drop for CombinedSignal {
    fn drop(&mut self) {
        for (source, id) in self.attached.drain(..) {
            source.remove_listener(id);
        }
    }
}
