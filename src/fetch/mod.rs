//! Fetch subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → client.rs (request_with_timeout_and_signals[_alt] / SignalClient)
//!     → combine/ (fast path or combined signal)
//!     → transport.rs (Transport::send, reqwest by default)
//!     → error.rs (network, aborted, timed out)
//! ```
//!
//! # Design Decisions
//! - Drop-in: with no options the request goes out exactly as the transport
//!   would send it on its own
//! - One request per call, never retried

pub mod client;
pub mod error;
pub mod options;
pub mod transport;

pub use client::{request_with_timeout_and_signals, request_with_timeout_and_signals_alt, SignalClient};
pub use error::{FetchError, FetchResult};
pub use options::{FetchOptions, RequestInit};
pub use transport::{ReqwestTransport, Transport};
