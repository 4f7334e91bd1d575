//! Request options.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;

use crate::signal::AbortSignal;

/// Options understood by a [`Transport`](crate::fetch::Transport).
///
/// This is what reaches the underlying request after the layer-only fields of
/// [`FetchOptions`] have been split off.
#[derive(Debug, Clone, Default)]
pub struct RequestInit {
    pub method: Method,
    pub headers: HeaderMap,
    /// Passed through untouched.
    pub body: Option<Vec<u8>>,
    /// The single cancellation signal the transport observes.
    pub signal: Option<AbortSignal>,
}

/// Request options plus the two fields only this layer understands.
///
/// # Examples
///
/// ```
/// use signal_fetch::{AbortController, FetchOptions};
///
/// let user = AbortController::new();
/// let shutdown = AbortController::new();
///
/// let options = FetchOptions::default()
///     .timeout_millis(5_000)
///     .signals(vec![user.signal(), shutdown.signal()]);
/// assert_eq!(options.timeout_millis, Some(5_000));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    /// Primary signal; merged after `signals`.
    pub signal: Option<AbortSignal>,

    /// Abort the request if it has not completed within this many
    /// milliseconds. `Some(0)` means no deadline.
    pub timeout_millis: Option<u64>,

    /// Additional independent abort sources, evaluated in order.
    pub signals: Option<Vec<AbortSignal>>,
}

impl FetchOptions {
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    #[must_use]
    pub fn timeout_millis(mut self, timeout_millis: u64) -> Self {
        self.timeout_millis = Some(timeout_millis);
        self
    }

    /// Replace the extra signals.
    #[must_use]
    pub fn signals(mut self, signals: Vec<AbortSignal>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Append one extra signal.
    #[must_use]
    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signals.get_or_insert_with(Vec::new).push(signal);
        self
    }

    /// Split into the pass-through request options and the layer-only
    /// `timeout_millis` and `signals`.
    pub fn into_parts(self) -> (RequestInit, Option<u64>, Option<Vec<AbortSignal>>) {
        let FetchOptions {
            method,
            headers,
            body,
            signal,
            timeout_millis,
            signals,
        } = self;

        let init = RequestInit {
            method,
            headers,
            body,
            signal,
        };
        (init, timeout_millis, signals)
    }
}

impl From<RequestInit> for FetchOptions {
    fn from(init: RequestInit) -> Self {
        Self {
            method: init.method,
            headers: init.headers,
            body: init.body,
            signal: init.signal,
            timeout_millis: None,
            signals: None,
        }
    }
}
