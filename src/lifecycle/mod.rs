//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → AbortController::abort("interrupted")
//!     → extra source of the in-flight request's combined signal
//! ```
//!
//! # Design Decisions
//! - Interrupts cancel the request instead of killing the process, so
//!   cleanup and error reporting still run

pub mod signals;

pub use signals::{ctrl_c_signal, InterruptSignal};
