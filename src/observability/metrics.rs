//! Metrics collection.
//!
//! # Metrics
//! - `signal_fetch_requests_total` (counter): requests by decision path
//!   (`plain`, `passthrough`, `direct`, `combined`)
//! - `signal_fetch_aborts_total` (counter): combined-signal aborts by reason kind
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; without an installed recorder
//!   every call is a no-op
//! - No exporter here: the embedding application chooses one

use crate::signal::AbortKind;

/// Count a request by the fast path it took.
pub fn record_path(path: &'static str) {
    ::metrics::counter!("signal_fetch_requests_total", "path" => path).increment(1);
}

/// Count a combined-signal abort.
pub fn record_abort(kind: &AbortKind) {
    ::metrics::counter!("signal_fetch_aborts_total", "kind" => kind.name().to_string()).increment(1);
}
