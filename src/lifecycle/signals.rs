//! OS signal handling.
//!
//! # Responsibilities
//! - Turn Ctrl-C (SIGINT) into an `AbortSignal`
//! - Stop listening for the OS signal once the guard is dropped
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - The interrupt is just one more abort source, merged like any other

use tokio::task::JoinHandle;

use crate::signal::{AbortController, AbortKind, AbortReason, AbortSignal};

/// Reason carried by the interrupt signal.
pub fn interrupted() -> AbortReason {
    AbortReason::new(AbortKind::Abort, "interrupted")
}

/// An abort signal fired by Ctrl-C.
#[derive(Debug)]
pub struct InterruptSignal {
    signal: AbortSignal,
    task: JoinHandle<()>,
}

impl InterruptSignal {
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }
}

impl Drop for InterruptSignal {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Listen for Ctrl-C and fire the returned signal when it arrives.
///
/// # Panics
/// Panics if called outside a Tokio runtime.
pub fn ctrl_c_signal() -> InterruptSignal {
    let controller = AbortController::new();
    let signal = controller.signal();

    let task = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, aborting request");
                controller.abort(interrupted());
            }
            Err(e) => tracing::warn!(error = %e, "Failed to listen for Ctrl-C"),
        }
    });

    InterruptSignal { signal, task }
}
