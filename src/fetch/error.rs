//! Errors surfaced by the reqwest-backed transport.

use thiserror::Error;

use crate::signal::{AbortKind, AbortReason};

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, protocol or client-construction failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request signal fired with a non-timeout reason.
    #[error("request aborted ({0})")]
    Aborted(AbortReason),

    /// The request signal fired because a deadline elapsed.
    #[error("request timed out ({0})")]
    TimedOut(AbortReason),
}

impl FetchError {
    /// Map a fired signal's reason to the matching variant.
    pub fn from_reason(reason: AbortReason) -> Self {
        match reason.kind() {
            AbortKind::Timeout => FetchError::TimedOut(reason),
            _ => FetchError::Aborted(reason),
        }
    }

    /// The abort reason, if the request was cancelled.
    pub fn reason(&self) -> Option<&AbortReason> {
        match self {
            FetchError::Aborted(reason) | FetchError::TimedOut(reason) => Some(reason),
            FetchError::Network(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::TimedOut(_))
    }
}

impl From<AbortReason> for FetchError {
    fn from(reason: AbortReason) -> Self {
        Self::from_reason(reason)
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
