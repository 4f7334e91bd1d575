//! Fast-path selection shared by both timeout strategies.

use crate::fetch::options::{FetchOptions, RequestInit};
use crate::signal::AbortSignal;

/// How a single call will be issued.
#[derive(Debug)]
pub(crate) enum Plan {
    /// No options at all: request without a signal.
    Plain,
    /// Options without timeout or signals: pass them through verbatim.
    Passthrough(RequestInit),
    /// Exactly one signal and no timeout: hand that signal over unwrapped.
    Direct(RequestInit),
    /// Two or more sources, or a timeout: merge into a combined signal.
    Combine {
        init: RequestInit,
        signals: Vec<AbortSignal>,
        timeout_millis: Option<u64>,
    },
}

impl Plan {
    pub(crate) fn from_options(options: Option<FetchOptions>) -> Self {
        let Some(options) = options else {
            return Plan::Plain;
        };

        let (mut init, timeout_millis, signals) = options.into_parts();
        let timeout_millis = timeout_millis.filter(|ms| *ms > 0);
        let mut signals = signals.unwrap_or_default();

        if timeout_millis.is_none() && signals.is_empty() && init.signal.is_none() {
            return Plan::Passthrough(init);
        }

        // The primary signal goes after the extras.
        if let Some(signal) = init.signal.take() {
            signals.push(signal);
        }

        if timeout_millis.is_none() && signals.len() == 1 {
            init.signal = signals.pop();
            return Plan::Direct(init);
        }

        Plan::Combine {
            init,
            signals,
            timeout_millis,
        }
    }

    /// Short label for logs and metrics.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Plan::Plain => "plain",
            Plan::Passthrough(_) => "passthrough",
            Plan::Direct(_) => "direct",
            Plan::Combine { .. } => "combined",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::AbortController;

    fn signals(n: usize) -> Vec<AbortSignal> {
        (0..n).map(|_| AbortController::new().signal()).collect()
    }

    #[test]
    fn test_no_options_is_plain() {
        assert!(matches!(Plan::from_options(None), Plan::Plain));
    }

    #[test]
    fn test_empty_options_pass_through() {
        let plan = Plan::from_options(Some(FetchOptions::default()));
        assert!(matches!(plan, Plan::Passthrough(ref init) if init.signal.is_none()));

        let plan = Plan::from_options(Some(FetchOptions::default().signals(Vec::new())));
        assert_eq!(plan.label(), "passthrough");
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let plan = Plan::from_options(Some(FetchOptions::default().timeout_millis(0)));
        assert_eq!(plan.label(), "passthrough");
    }

    #[test]
    fn test_single_extra_signal_is_direct() {
        let only = AbortController::new().signal();
        let plan = Plan::from_options(Some(FetchOptions::default().with_signal(only.clone())));
        match plan {
            Plan::Direct(init) => assert!(init.signal.unwrap().ptr_eq(&only)),
            other => panic!("expected direct, got {}", other.label()),
        }
    }

    #[test]
    fn test_primary_signal_alone_is_direct() {
        let primary = AbortController::new().signal();
        let plan = Plan::from_options(Some(FetchOptions::default().signal(primary.clone())));
        match plan {
            Plan::Direct(init) => assert!(init.signal.unwrap().ptr_eq(&primary)),
            other => panic!("expected direct, got {}", other.label()),
        }
    }

    #[test]
    fn test_primary_plus_extra_is_combined_with_primary_last() {
        let primary = AbortController::new().signal();
        let extra = AbortController::new().signal();
        let plan = Plan::from_options(Some(
            FetchOptions::default()
                .signal(primary.clone())
                .with_signal(extra.clone()),
        ));
        match plan {
            Plan::Combine {
                init,
                signals,
                timeout_millis,
            } => {
                assert!(init.signal.is_none());
                assert_eq!(signals.len(), 2);
                assert!(signals[0].ptr_eq(&extra));
                assert!(signals[1].ptr_eq(&primary));
                assert!(timeout_millis.is_none());
            }
            other => panic!("expected combined, got {}", other.label()),
        }
    }

    #[test]
    fn test_single_signal_with_timeout_is_combined() {
        let plan = Plan::from_options(Some(
            FetchOptions::default()
                .timeout_millis(10)
                .signals(signals(1)),
        ));
        assert!(matches!(
            plan,
            Plan::Combine { ref signals, timeout_millis: Some(10), .. } if signals.len() == 1
        ));
    }

    #[test]
    fn test_timeout_alone_is_combined() {
        let plan = Plan::from_options(Some(FetchOptions::default().timeout_millis(10)));
        assert!(matches!(
            plan,
            Plan::Combine { ref signals, timeout_millis: Some(10), .. } if signals.is_empty()
        ));
    }
}
