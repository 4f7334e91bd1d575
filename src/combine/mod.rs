//! Signal combination.
//!
//! # Data Flow
//! ```text
//! FetchOptions
//!     → plan.rs (no options / pass-through / single signal / combine)
//!     → Combine:
//!         TimeoutStrategy::Signal → AbortSignal::timeout appended to sources
//!         TimeoutStrategy::Timer  → timer.rs arms a guarded one-shot task
//!     → merge.rs (fan-in of sources into the per-call combined signal)
//!     → Transport::send with the combined signal
//! ```
//!
//! # Design Decisions
//! - Fast paths allocate nothing when composition isn't needed
//! - The combined signal, its listeners and its timer never outlive the call
//! - Both strategies share the fan-in; only the deadline source differs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub(crate) mod merge;
pub(crate) mod plan;
pub(crate) mod timer;

/// How a request deadline is realized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutStrategy {
    /// A self-firing [`AbortSignal::timeout`](crate::AbortSignal::timeout)
    /// merged like any other source.
    #[default]
    Signal,
    /// A one-shot timer that fires the combined signal with
    /// `signal timed out (<ms>ms)` and is cancelled when the call settles.
    Timer,
}

impl fmt::Display for TimeoutStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeoutStrategy::Signal => write!(f, "signal"),
            TimeoutStrategy::Timer => write!(f, "timer"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown timeout strategy '{0}' (expected 'signal' or 'timer')")]
pub struct ParseStrategyError(String);

impl FromStr for TimeoutStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signal" => Ok(TimeoutStrategy::Signal),
            "timer" => Ok(TimeoutStrategy::Timer),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}
