//! Request entry points.
//!
//! # Responsibilities
//! - Pick the fast path for the given options
//! - Build and wire the per-call combined signal
//! - Realize the deadline with the requested strategy
//! - Hand exactly one request to the transport
//!
//! # Design Decisions
//! - Transport errors are returned untouched; this layer only decides
//!   whether and why the request is cancelled
//! - Cleanup is RAII: the combined signal and timer guard are locals of the
//!   request future, released on success, error or drop

use std::time::Duration;

use tracing::Instrument;
use url::Url;
use uuid::Uuid;

use crate::combine::merge::CombinedSignal;
use crate::combine::plan::Plan;
use crate::combine::timer::TimerGuard;
use crate::combine::TimeoutStrategy;
use crate::config::ClientSettings;
use crate::fetch::error::FetchResult;
use crate::fetch::options::{FetchOptions, RequestInit};
use crate::fetch::transport::{ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::signal::AbortSignal;

/// Send a request that aborts when any signal fires or the timeout elapses.
///
/// The deadline is a self-firing [`AbortSignal::timeout`]. With `options`
/// set to `None` this is exactly `transport.send(target, RequestInit::default())`.
///
/// # Panics
/// Panics if a timeout is set and this is called outside a Tokio runtime.
pub async fn request_with_timeout_and_signals<T: Transport>(
    transport: &T,
    target: &Url,
    options: Option<FetchOptions>,
) -> Result<T::Response, T::Error> {
    execute(transport, target, options, TimeoutStrategy::Signal).await
}

/// Same as [`request_with_timeout_and_signals`], but the deadline is a
/// one-shot timer that aborts with `signal timed out (<ms>ms)` and is
/// cancelled as soon as the request settles.
///
/// # Panics
/// Panics if a timeout is set and this is called outside a Tokio runtime.
pub async fn request_with_timeout_and_signals_alt<T: Transport>(
    transport: &T,
    target: &Url,
    options: Option<FetchOptions>,
) -> Result<T::Response, T::Error> {
    execute(transport, target, options, TimeoutStrategy::Timer).await
}

pub(crate) async fn execute<T: Transport>(
    transport: &T,
    target: &Url,
    options: Option<FetchOptions>,
    strategy: TimeoutStrategy,
) -> Result<T::Response, T::Error> {
    let plan = Plan::from_options(options);
    metrics::record_path(plan.label());
    tracing::debug!(url = %target, path = plan.label(), "Dispatching request");

    match plan {
        Plan::Plain => transport.send(target, RequestInit::default()).await,
        Plan::Passthrough(init) | Plan::Direct(init) => transport.send(target, init).await,
        Plan::Combine {
            init,
            signals,
            timeout_millis,
        } => {
            let span = tracing::info_span!(
                "fetch",
                request_id = %Uuid::new_v4(),
                %strategy,
                sources = signals.len(),
                timeout_millis = timeout_millis.unwrap_or(0),
            );
            send_combined(transport, target, init, signals, timeout_millis, strategy)
                .instrument(span)
                .await
        }
    }
}

async fn send_combined<T: Transport>(
    transport: &T,
    target: &Url,
    mut init: RequestInit,
    mut signals: Vec<AbortSignal>,
    timeout_millis: Option<u64>,
    strategy: TimeoutStrategy,
) -> Result<T::Response, T::Error> {
    let mut combined = CombinedSignal::new();

    let timer = match (strategy, timeout_millis) {
        (TimeoutStrategy::Signal, Some(ms)) => {
            signals.push(AbortSignal::timeout(Duration::from_millis(ms)));
            None
        }
        (TimeoutStrategy::Timer, Some(ms)) => Some(TimerGuard::arm(&combined.signal(), ms)),
        (_, None) => None,
    };

    combined.attach_all(signals);
    init.signal = Some(combined.signal());

    let result = transport.send(target, init).await;
    drop(timer);
    result
}

/// A transport bundled with client settings: default timeout and strategy.
#[derive(Debug, Clone)]
pub struct SignalClient<T> {
    transport: T,
    settings: ClientSettings,
}

impl SignalClient<ReqwestTransport> {
    /// Build a reqwest-backed client from the `[client]` configuration section.
    pub fn from_settings(settings: ClientSettings) -> FetchResult<Self> {
        let transport = ReqwestTransport::from_settings(&settings)?;
        Ok(Self::new(transport, settings))
    }
}

impl<T: Transport> SignalClient<T> {
    pub fn new(transport: T, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// Send with the configured strategy.
    pub async fn fetch(
        &self,
        target: &Url,
        options: Option<FetchOptions>,
    ) -> Result<T::Response, T::Error> {
        self.fetch_with(self.settings.strategy, target, options).await
    }

    /// Send with an explicit strategy.
    ///
    /// The configured default timeout applies when the caller sets none, so
    /// with a nonzero default even `None` options take the combined path.
    pub async fn fetch_with(
        &self,
        strategy: TimeoutStrategy,
        target: &Url,
        options: Option<FetchOptions>,
    ) -> Result<T::Response, T::Error> {
        let options = self.apply_default_timeout(options);
        execute(&self.transport, target, options, strategy).await
    }

    fn apply_default_timeout(&self, options: Option<FetchOptions>) -> Option<FetchOptions> {
        let default_timeout = self.settings.default_timeout_millis;
        if default_timeout == 0 {
            return options;
        }
        let mut options = options.unwrap_or_default();
        if options.timeout_millis.is_none() {
            options.timeout_millis = Some(default_timeout);
        }
        Some(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::error::FetchError;
    use crate::signal::{AbortController, AbortKind, AbortReason};
    use reqwest::header::{HeaderValue, ACCEPT};
    use reqwest::Method;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Answers after `delay` unless its signal fires first.
    struct MockTransport {
        delay: Duration,
        seen: Mutex<Vec<RequestInit>>,
    }

    impl MockTransport {
        fn responding_after(millis: u64) -> Self {
            Self {
                delay: Duration::from_millis(millis),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn never_responding() -> Self {
            Self::responding_after(3_600_000)
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last(&self) -> RequestInit {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl Transport for MockTransport {
        type Response = &'static str;
        type Error = FetchError;

        async fn send(&self, _target: &Url, init: RequestInit) -> Result<&'static str, FetchError> {
            let signal = init.signal.clone();
            self.seen.lock().unwrap().push(init);

            let Some(signal) = signal else {
                tokio::time::sleep(self.delay).await;
                return Ok("ok");
            };
            if let Some(reason) = signal.reason() {
                return Err(FetchError::from_reason(reason));
            }
            tokio::select! {
                reason = signal.aborted() => Err(FetchError::from_reason(reason)),
                _ = tokio::time::sleep(self.delay) => Ok("ok"),
            }
        }
    }

    fn url() -> Url {
        Url::parse("http://localhost/resource").unwrap()
    }

    fn controllers(n: usize) -> Vec<AbortController> {
        (0..n).map(|_| AbortController::new()).collect()
    }

    fn signals_of(controllers: &[AbortController]) -> Vec<AbortSignal> {
        controllers.iter().map(AbortController::signal).collect()
    }

    fn assert_near(elapsed: Duration, millis: u64) {
        let expected = Duration::from_millis(millis);
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(2),
            "elapsed {:?}, expected about {:?}",
            elapsed,
            expected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_options_sends_plain_request() {
        let transport = MockTransport::responding_after(1);
        let res = request_with_timeout_and_signals(&transport, &url(), None).await;

        assert_eq!(res.unwrap(), "ok");
        let init = transport.last();
        assert!(init.signal.is_none());
        assert_eq!(init.method, Method::GET);
        assert!(init.headers.is_empty());
        assert!(init.body.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_options_without_signals_pass_through() {
        let transport = MockTransport::responding_after(1);
        let options = FetchOptions::default()
            .method(Method::PUT)
            .header(ACCEPT, HeaderValue::from_static("text/plain"))
            .body("data")
            .timeout_millis(0)
            .signals(Vec::new());

        request_with_timeout_and_signals_alt(&transport, &url(), Some(options))
            .await
            .unwrap();

        let init = transport.last();
        assert!(init.signal.is_none());
        assert_eq!(init.method, Method::PUT);
        assert_eq!(init.headers.get(ACCEPT).unwrap(), "text/plain");
        assert_eq!(init.body.as_deref(), Some(&b"data"[..]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_signal_is_passed_unwrapped() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let transport = MockTransport::responding_after(1);
            let controller = AbortController::new();
            let options = FetchOptions::default().signals(vec![controller.signal()]);

            execute(&transport, &url(), Some(options), strategy)
                .await
                .unwrap();

            let passed = transport.last().signal.unwrap();
            assert!(passed.ptr_eq(&controller.signal()));
            assert_eq!(controller.signal().listener_count(), 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_aborted_signal_rejects_immediately() {
        let expected = AbortReason::new(AbortKind::Abort, "Any reason");

        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let aborted = AbortController::new();
            aborted.abort(expected.clone());

            let transport = MockTransport::never_responding();
            let err = execute(
                &transport,
                &url(),
                Some(FetchOptions::default().signal(aborted.signal())),
                strategy,
            )
            .await
            .unwrap_err();
            assert_eq!(err.reason(), Some(&expected));

            let others = controllers(2);
            let start = Instant::now();
            let options = FetchOptions::default()
                .timeout_millis(10)
                .signal(aborted.signal())
                .signals(signals_of(&others));
            let err = execute(&transport, &url(), Some(options), strategy)
                .await
                .unwrap_err();

            assert_eq!(err.reason(), Some(&expected));
            assert_eq!(start.elapsed(), Duration::ZERO);
            for other in &others {
                assert_eq!(other.signal().listener_count(), 0);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_signal_strategy() {
        let transport = MockTransport::never_responding();
        let start = Instant::now();
        let err = request_with_timeout_and_signals(
            &transport,
            &url(),
            Some(FetchOptions::default().timeout_millis(10)),
        )
        .await
        .unwrap_err();

        assert_near(start.elapsed(), 10);
        assert!(err.is_timeout());
        assert!(err.to_string().to_lowercase().contains("timeout"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_timer_strategy() {
        let transport = MockTransport::never_responding();
        let start = Instant::now();
        let err = request_with_timeout_and_signals_alt(
            &transport,
            &url(),
            Some(FetchOptions::default().timeout_millis(10)),
        )
        .await
        .unwrap_err();

        assert_near(start.elapsed(), 10);
        let reason = err.reason().unwrap();
        assert_eq!(reason.message(), "signal timed out (10ms)");
        assert_eq!(reason.kind().name(), "TimeoutError");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_wins_over_idle_signals() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            for with_primary in [false, true] {
                let transport = MockTransport::never_responding();
                let extras = controllers(2);
                let primary = AbortController::new();

                let mut options = FetchOptions::default()
                    .timeout_millis(10)
                    .signals(signals_of(&extras));
                if with_primary {
                    options = options.signal(primary.signal());
                }

                let start = Instant::now();
                let err = execute(&transport, &url(), Some(options), strategy)
                    .await
                    .unwrap_err();

                assert_near(start.elapsed(), 10);
                assert!(err.is_timeout());
                assert!(!primary.signal().is_aborted());
                for extra in &extras {
                    assert!(!extra.signal().is_aborted());
                    assert_eq!(extra.signal().listener_count(), 0);
                }
                assert_eq!(primary.signal().listener_count(), 0);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_of_five_signals_aborts() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            for with_primary in [false, true] {
                let transport = MockTransport::never_responding();
                let mut sources = controllers(5);
                let signals = signals_of(&sources);
                let primary = AbortController::new();

                let mut options = FetchOptions::default().signals(signals);
                if with_primary {
                    options = options.signal(primary.signal());
                }

                let firing = sources.remove(2);
                let third = firing.signal();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    firing.abort(AbortReason::new(AbortKind::Abort, "third"));
                });

                let start = Instant::now();
                let err = execute(&transport, &url(), Some(options), strategy)
                    .await
                    .unwrap_err();

                assert_near(start.elapsed(), 10);
                assert!(!err.is_timeout());
                assert_eq!(err.reason().unwrap().message(), "third");
                assert!(third.is_aborted());
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hundred_signals_leave_no_listeners() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let transport = MockTransport::never_responding();
            let sources = controllers(100);
            let options = FetchOptions::default()
                .timeout_millis(10)
                .signals(signals_of(&sources));

            let err = execute(&transport, &url(), Some(options), strategy)
                .await
                .unwrap_err();

            assert!(err.is_timeout());
            for source in &sources {
                assert_eq!(source.signal().listener_count(), 0);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_request_leaves_nothing_armed() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let transport = MockTransport::responding_after(5);
            let sources = controllers(3);
            let options = FetchOptions::default()
                .timeout_millis(50)
                .signals(signals_of(&sources));

            let res = execute(&transport, &url(), Some(options), strategy).await;
            assert_eq!(res.unwrap(), "ok");

            let combined = transport.last().signal.unwrap();
            for source in &sources {
                assert!(!combined.ptr_eq(&source.signal()));
                assert_eq!(source.signal().listener_count(), 0);
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(!combined.is_aborted());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_request_cancels_timer_and_listeners() {
        let transport = MockTransport::never_responding();
        let sources = controllers(2);
        let options = FetchOptions::default()
            .timeout_millis(50)
            .signals(signals_of(&sources));

        let target = url();
        let pending = request_with_timeout_and_signals_alt(&transport, &target, Some(options));
        assert!(tokio::time::timeout(Duration::from_millis(5), pending)
            .await
            .is_err());

        let combined = transport.last().signal.unwrap();
        for source in &sources {
            assert_eq!(source.signal().listener_count(), 0);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!combined.is_aborted());
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_applies_default_timeout() {
        let settings = ClientSettings {
            default_timeout_millis: 10,
            strategy: TimeoutStrategy::Timer,
            ..ClientSettings::default()
        };
        let client = SignalClient::new(MockTransport::never_responding(), settings);

        let err = client.fetch(&url(), None).await.unwrap_err();
        assert_eq!(err.reason().unwrap().message(), "signal timed out (10ms)");

        let err = client
            .fetch(&url(), Some(FetchOptions::default().timeout_millis(20)))
            .await
            .unwrap_err();
        assert_eq!(err.reason().unwrap().message(), "signal timed out (20ms)");

        let err = client
            .fetch_with(TimeoutStrategy::Signal, &url(), None)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_ne!(err.reason().unwrap().message(), "signal timed out (10ms)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_without_default_is_plain() {
        let client = SignalClient::new(MockTransport::responding_after(1), ClientSettings::default());
        client.fetch(&url(), None).await.unwrap();
        assert!(client.transport().last().signal.is_none());
        assert_eq!(client.settings().strategy, TimeoutStrategy::Signal);
        assert_eq!(client.settings().default_timeout_millis, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_fired_extra_signal_wins_over_primary() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let extra = AbortController::new();
            let primary = AbortController::new();
            extra.abort(AbortReason::new(AbortKind::Abort, "extra"));
            primary.abort(AbortReason::new(AbortKind::Abort, "primary"));

            let transport = MockTransport::never_responding();
            let options = FetchOptions::default()
                .signal(primary.signal())
                .with_signal(extra.signal());
            let err = execute(&transport, &url(), Some(options), strategy)
                .await
                .unwrap_err();
            assert_eq!(err.reason().unwrap().message(), "extra");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_signal_leaves_no_listeners() {
        for strategy in [TimeoutStrategy::Signal, TimeoutStrategy::Timer] {
            let transport = MockTransport::responding_after(1);
            let source = AbortController::new();
            let options = FetchOptions::default()
                .timeout_millis(50)
                .signals(vec![source.signal(), source.signal()])
                .signal(source.signal());

            execute(&transport, &url(), Some(options), strategy)
                .await
                .unwrap();
            assert_eq!(source.signal().listener_count(), 0);
        }
    }
}
