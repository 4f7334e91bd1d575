//! Cancellation signals.
//!
//! # Data Flow
//! ```text
//! AbortController::abort(reason)
//!     → abort.rs (record reason once, take listeners)
//!     → wake tasks awaiting AbortSignal::aborted()
//!     → run listeners in registration order
//!
//! AbortSignal::timeout(duration)
//!     → timeout.rs (weakly-held timer task)
//!     → fires like a controller abort with a TimeoutError reason
//! ```
//!
//! # Design Decisions
//! - Signals are cheap `Arc` handles; the controller is the only public trigger
//! - Reasons are plain values (`AbortReason`), compared by kind and message
//! - Scoped listeners unregister themselves when their scope signal fires

pub mod abort;
pub mod reason;
pub mod timeout;

pub use abort::{AbortController, AbortSignal, ListenerId};
pub use reason::{AbortKind, AbortReason};
