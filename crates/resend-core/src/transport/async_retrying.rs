//! Async retry driver. Same decisions as [`RetryTransport`](super::RetryTransport);
//! waits yield to the tokio scheduler instead of blocking a thread.

use async_trait::async_trait;

use super::shutdown::CloseSignal;
use super::AsyncTransport;
use crate::http::{Request, Response};
use crate::retry::{decide, AttemptState, RetryDecision, RetryPolicy, TransportError};

/// Wraps an [`AsyncTransport`] and retries requests according to a
/// [`RetryPolicy`].
///
/// Dropping the future returned by [`send`](Self::send) (for example via
/// `tokio::time::timeout`) while it waits between attempts cancels the call;
/// no response is held at that point.
pub struct AsyncRetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
    signal: CloseSignal,
}

impl<T: AsyncTransport> AsyncRetryTransport<T> {
    pub fn new(inner: T) -> Self {
        Self::with_policy(inner, RetryPolicy::default())
    }

    pub fn with_policy(inner: T, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            signal: CloseSignal::new(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn is_closed(&self) -> bool {
        self.signal.is_closed()
    }

    pub async fn send(&self, request: &Request) -> Result<T::Response, TransportError> {
        if self.signal.is_closed() {
            return Err(TransportError::closed());
        }
        if !self.policy.is_retryable_method(request.method()) {
            return self.attempt(request).await;
        }

        let mut policy = self.policy.reset();
        loop {
            tracing::trace!(state = ?AttemptState::Attempting, attempt = policy.attempts_made());
            let outcome = self.attempt(request).await;
            let decision = decide(&policy, outcome);
            tracing::trace!(state = ?decision.state(), attempt = policy.attempts_made());
            let (next, delay) = match decision {
                RetryDecision::Finish(result) => return result,
                RetryDecision::RetryAfter { policy, delay } => (policy, delay),
            };
            if self.signal.wait(delay).await {
                tracing::debug!(state = ?AttemptState::Failed, "transport closed while waiting to retry");
                return Err(TransportError::closed());
            }
            policy = next;
        }
    }

    async fn attempt(&self, request: &Request) -> Result<T::Response, TransportError> {
        if self.signal.is_closed() {
            return Err(TransportError::closed());
        }
        let outcome = self.inner.send(request).await;
        if self.signal.is_closed() {
            if let Ok(response) = outcome {
                response.close();
            }
            return Err(TransportError::closed());
        }
        outcome
    }

    /// Close the wrapped transport once; waiting calls return `Closed`.
    pub async fn close(&self) {
        if self.signal.close() {
            self.inner.close().await;
            tracing::info!("async retry transport closed");
        }
    }
}

#[async_trait]
impl<T: AsyncTransport> AsyncTransport for AsyncRetryTransport<T> {
    type Response = T::Response;

    async fn send(&self, request: &Request) -> Result<Self::Response, TransportError> {
        AsyncRetryTransport::send(self, request).await
    }

    async fn close(&self) {
        AsyncRetryTransport::close(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::BufferedResponse;
    use crate::retry::ErrorKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct AlwaysStatus {
        status: u16,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl AsyncTransport for AlwaysStatus {
        type Response = BufferedResponse;

        async fn send(&self, _request: &Request) -> Result<BufferedResponse, TransportError> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(BufferedResponse::new(self.status).with_header("Retry-After", "30"))
        }
    }

    fn transport(status: u16, total: u32) -> AsyncRetryTransport<AlwaysStatus> {
        let policy = RetryPolicy::builder().total(total).build().unwrap();
        AsyncRetryTransport::with_policy(
            AlwaysStatus {
                status,
                sends: AtomicUsize::new(0),
            },
            policy,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn waits_follow_retry_after() {
        let t = transport(503, 2);
        let start = tokio::time::Instant::now();
        let resp = t.send(&Request::get("http://example.test/").unwrap()).await.unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(t.inner().sends.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test]
    async fn closed_transport_rejects_sends() {
        let t = transport(200, 2);
        t.close().await;
        let err = t.send(&Request::get("http://example.test/").unwrap()).await.unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Closed);
        assert_eq!(t.inner().sends.load(Ordering::SeqCst), 0);
    }
}
