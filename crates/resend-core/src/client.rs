//! Ready-made clients: curl transport wrapped in a retrying transport,
//! configured from [`ResendConfig`].

use anyhow::Result;

use crate::config::ResendConfig;
use crate::http::{BufferedResponse, Request};
use crate::retry::{RetryPolicy, TransportError};
use crate::transport::{AsyncCurlTransport, AsyncRetryTransport, CurlTransport, RetryTransport};

/// Blocking client that retries failed requests.
///
/// ```no_run
/// use resend_core::client::RetryClient;
/// use resend_core::config::ResendConfig;
///
/// let client = RetryClient::from_config(&ResendConfig::default())?;
/// let response = client.get("https://example.com")?;
/// println!("{}", response.status);
/// client.close();
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct RetryClient {
    transport: RetryTransport<CurlTransport>,
}

impl RetryClient {
    pub fn from_config(cfg: &ResendConfig) -> Result<Self> {
        let policy = cfg.retry.to_policy()?;
        Ok(Self::with_policy(cfg, policy))
    }

    /// Use `policy` instead of the one described by `cfg.retry`.
    pub fn with_policy(cfg: &ResendConfig, policy: RetryPolicy) -> Self {
        let curl = CurlTransport::new(cfg.transport.to_curl_options());
        Self {
            transport: RetryTransport::with_policy(curl, policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.transport.policy()
    }

    pub fn get(&self, url: &str) -> Result<BufferedResponse, TransportError> {
        self.send(&Request::get(url)?)
    }

    pub fn send(&self, request: &Request) -> Result<BufferedResponse, TransportError> {
        self.transport.send(request)
    }

    pub fn close(&self) {
        self.transport.close();
    }
}

/// Async counterpart of [`RetryClient`]; requires a tokio runtime.
pub struct AsyncRetryClient {
    transport: AsyncRetryTransport<AsyncCurlTransport>,
}

impl AsyncRetryClient {
    pub fn from_config(cfg: &ResendConfig) -> Result<Self> {
        let policy = cfg.retry.to_policy()?;
        Ok(Self::with_policy(cfg, policy))
    }

    pub fn with_policy(cfg: &ResendConfig, policy: RetryPolicy) -> Self {
        let curl = AsyncCurlTransport::new(cfg.transport.to_curl_options());
        Self {
            transport: AsyncRetryTransport::with_policy(curl, policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.transport.policy()
    }

    pub async fn get(&self, url: &str) -> Result<BufferedResponse, TransportError> {
        self.send(&Request::get(url)?).await
    }

    pub async fn send(&self, request: &Request) -> Result<BufferedResponse, TransportError> {
        self.transport.send(request).await
    }

    pub async fn close(&self) {
        self.transport.close().await;
    }
}
