//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Fetch entry points and the combinator produce:
//!     → tracing events (path taken, deadline fired, signal cancelled)
//!     → a `fetch` span with a request ID around every combined call
//!     → metrics.rs (counters by path and abort kind)
//!
//! Consumers:
//!     → logging.rs subscriber installed by the binary
//!     → any `metrics` recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON optional) for machine parsing
//! - Request ID only allocated on the combined path; fast paths stay cheap
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
