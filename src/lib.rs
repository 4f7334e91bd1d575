//! HTTP requests with a timeout and any number of abort signals.
//!
//! Every source (caller signals, the primary `signal`, the deadline) is
//! merged into one per-call signal that fires with the reason of whichever
//! source fires first. Two deadline strategies are available; see
//! [`TimeoutStrategy`].
//!
//! ```no_run
//! use signal_fetch::{request_with_timeout_and_signals, AbortController, FetchOptions, ReqwestTransport};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::default();
//! let user = AbortController::new();
//!
//! let options = FetchOptions::default()
//!     .timeout_millis(2_000)
//!     .with_signal(user.signal());
//! let url = "https://example.com/".parse()?;
//! let response = request_with_timeout_and_signals(&transport, &url, Some(options)).await?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod combine;
pub mod config;
pub mod fetch;
pub mod lifecycle;
pub mod observability;
pub mod signal;

pub use combine::TimeoutStrategy;
pub use config::{ClientSettings, Config};
pub use fetch::{
    request_with_timeout_and_signals, request_with_timeout_and_signals_alt, FetchError,
    FetchOptions, ReqwestTransport, RequestInit, SignalClient, Transport,
};
pub use signal::{AbortController, AbortKind, AbortReason, AbortSignal};
