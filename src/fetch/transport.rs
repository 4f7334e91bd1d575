//! The underlying request function.
//!
//! # Responsibilities
//! - Issue one HTTP request per call
//! - Turn a fired request signal into an error
//!
//! # Design Decisions
//! - The combinator only ever talks to the `Transport` trait, so tests and
//!   other HTTP stacks can stand in for reqwest
//! - Cancellation covers the exchange up to response headers; reading the
//!   body is left to the caller

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::ClientSettings;
use crate::fetch::error::{FetchError, FetchResult};
use crate::fetch::options::RequestInit;

/// Asynchronous request function the combinator wraps.
///
/// Implementations must fail promptly once `init.signal` fires, and must
/// fail immediately if it has already fired when `send` is called.
pub trait Transport: Send + Sync {
    type Response: Send;
    type Error: std::error::Error + Send + 'static;

    fn send(
        &self,
        target: &Url,
        init: RequestInit,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

/// Production transport over a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the `[client]` configuration section.
    pub fn from_settings(settings: &ClientSettings) -> FetchResult<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.clone());
        if settings.connect_timeout_millis > 0 {
            builder = builder.connect_timeout(Duration::from_millis(settings.connect_timeout_millis));
        }
        Ok(Self::new(builder.build()?))
    }
}

impl Transport for ReqwestTransport {
    type Response = reqwest::Response;
    type Error = FetchError;

    async fn send(&self, target: &Url, init: RequestInit) -> FetchResult<reqwest::Response> {
        let RequestInit {
            method,
            headers,
            body,
            signal,
        } = init;

        let mut request = self.client.request(method, target.clone()).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let Some(signal) = signal else {
            return Ok(request.send().await?);
        };
        if let Some(reason) = signal.reason() {
            return Err(FetchError::from_reason(reason));
        }

        tokio::select! {
            biased;
            reason = signal.aborted() => {
                tracing::debug!(url = %target, reason = %reason, "Request cancelled by signal");
                Err(FetchError::from_reason(reason))
            }
            response = request.send() => Ok(response?),
        }
    }
}
