//! Abort reasons carried by a fired signal.

use std::fmt;

use thiserror::Error;

/// Category of an abort, named after the error it surfaces as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbortKind {
    /// Explicit cancellation by the owner of a signal.
    Abort,
    /// Cancellation because a deadline elapsed.
    Timeout,
    /// Caller-defined category.
    Other(String),
}

impl AbortKind {
    /// Error name for this kind (`AbortError`, `TimeoutError`, or the custom name).
    pub fn name(&self) -> &str {
        match self {
            AbortKind::Abort => "AbortError",
            AbortKind::Timeout => "TimeoutError",
            AbortKind::Other(name) => name,
        }
    }
}

impl fmt::Display for AbortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a signal fired.
///
/// Displays as `<kind>: <message>`, e.g. `TimeoutError: signal timed out (10ms)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct AbortReason {
    kind: AbortKind,
    message: String,
}

impl AbortReason {
    pub fn new(kind: AbortKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Reason used when a controller aborts without supplying one.
    pub fn aborted() -> Self {
        Self::new(AbortKind::Abort, "This operation was aborted")
    }

    /// Reason carried by signals from [`AbortSignal::timeout`](crate::AbortSignal::timeout).
    pub fn timed_out() -> Self {
        Self::new(AbortKind::Timeout, "The operation was aborted due to timeout")
    }

    /// Reason produced by the manual timer strategy.
    pub fn timer_elapsed(timeout_millis: u64) -> Self {
        Self::new(
            AbortKind::Timeout,
            format!("signal timed out ({}ms)", timeout_millis),
        )
    }

    pub fn kind(&self) -> &AbortKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == AbortKind::Timeout
    }
}

impl Default for AbortReason {
    fn default() -> Self {
        Self::aborted()
    }
}
