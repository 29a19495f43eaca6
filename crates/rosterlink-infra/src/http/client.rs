use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use rosterlink_domain::RosterError;
use tracing::debug;

use crate::errors::InfraError;

/// HTTP transport shared by the membership backends.
///
/// [`HttpClient::send`] retries only failures that are safe to replay:
/// timeouts, connect errors, and 5xx responses. That is correct for the
/// workgroup PUT/DELETE-per-UID calls and for all reads, but not for
/// requests whose replay would repeat a remote side effect (contact
/// creation); those go through [`HttpClient::send_once`].
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, RosterError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder with retry semantics.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, RosterError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 1..=attempts {
            let request = builder
                .try_clone()
                .ok_or_else(|| {
                    RosterError::Internal(
                        "request body cannot be cloned; buffer the body to enable retries".into(),
                    )
                })?
                .build()
                .map_err(into_roster_error)?;

            let method = request.method().clone();
            let url = request.url().clone();

            match self.client.execute(request).await {
                Ok(response) if response.status().is_server_error() && attempt < attempts => {
                    debug!(attempt, %method, %url, status = %response.status(), "retrying after server error");
                    self.pause_before_retry(attempt).await;
                }
                Ok(response) => {
                    debug!(attempt, %method, %url, status = %response.status(), "received HTTP response");
                    return Ok(response);
                }
                Err(err) if attempt < attempts && is_transient(&err) => {
                    debug!(attempt, %method, %url, error = %err, "retrying after transport failure");
                    self.pause_before_retry(attempt).await;
                }
                Err(err) => return Err(into_roster_error(err)),
            }
        }

        Err(RosterError::Internal("http client exhausted retries without producing a result".into()))
    }

    /// Execute the provided request builder exactly once, with no retry.
    ///
    /// For requests that are not safe to replay: a retried contact
    /// creation that already landed would create a duplicate.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response, RosterError> {
        let request = builder.build().map_err(into_roster_error)?;
        debug!(method = %request.method(), url = %request.url(), "sending single-attempt HTTP request");
        self.client.execute(request).await.map_err(into_roster_error)
    }

    async fn pause_before_retry(&self, completed_attempts: usize) {
        let shift = completed_attempts.saturating_sub(1).min(8) as u32;
        let delay = self.base_backoff.saturating_mul(1u32 << shift);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    identity: Option<reqwest::Identity>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            identity: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// Client certificate for backends requiring mutual TLS.
    pub fn identity(mut self, identity: reqwest::Identity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn build(self) -> Result<HttpClient, RosterError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(identity) = self.identity {
            builder = builder.identity(identity);
        }

        let client = builder.build().map_err(into_roster_error)?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

fn into_roster_error(err: reqwest::Error) -> RosterError {
    let infra: InfraError = err.into();
    RosterError::from(infra)
}

fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_request() {
        return true;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}
