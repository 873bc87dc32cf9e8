//! Blocking retry driver.

use super::shutdown::CloseSignal;
use super::Transport;
use crate::http::{Request, Response};
use crate::retry::{decide, AttemptState, RetryDecision, RetryPolicy, TransportError};

/// Wraps a blocking [`Transport`] and retries requests according to a
/// [`RetryPolicy`]. Waits between attempts block the calling thread.
///
/// ```no_run
/// use resend_core::http::Request;
/// use resend_core::retry::RetryPolicy;
/// use resend_core::transport::{CurlTransport, RetryTransport};
///
/// let policy = RetryPolicy::builder().total(5).backoff_factor(0.5).build()?;
/// let transport = RetryTransport::with_policy(CurlTransport::default(), policy);
/// let response = transport.send(&Request::get("https://example.com")?)?;
/// println!("{}", response.status);
/// transport.close();
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
    signal: CloseSignal,
}

impl<T: Transport> RetryTransport<T> {
    /// Wrap `inner` with the default policy (10 retries, no backoff).
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

    /// Send `request`, retrying retryable statuses and errors.
    ///
    /// Requests whose method is not retryable are sent once. When the status
    /// budget runs out the last response is returned; when the error budget
    /// runs out the last error is.
    pub fn send(&self, request: &Request) -> Result<T::Response, TransportError> {
        if self.signal.is_closed() {
            return Err(TransportError::closed());
        }
        if !self.policy.is_retryable_method(request.method()) {
            return self.attempt(request);
        }

        let mut policy = self.policy.reset();
        loop {
            tracing::trace!(state = ?AttemptState::Attempting, attempt = policy.attempts_made());
            let outcome = self.attempt(request);
            let decision = decide(&policy, outcome);
            tracing::trace!(state = ?decision.state(), attempt = policy.attempts_made());
            match decision {
                RetryDecision::Finish(result) => return result,
                RetryDecision::RetryAfter { policy: next, delay } => {
                    if self.signal.wait_blocking(delay) {
                        tracing::debug!(state = ?AttemptState::Failed, "transport closed while waiting to retry");
                        return Err(TransportError::closed());
                    }
                    policy = next;
                }
            }
        }
    }

    /// One call to the wrapped transport. A response that arrives after
    /// `close` is released instead of being returned.
    fn attempt(&self, request: &Request) -> Result<T::Response, TransportError> {
        if self.signal.is_closed() {
            return Err(TransportError::closed());
        }
        let outcome = self.inner.send(request);
        if self.signal.is_closed() {
            if let Ok(response) = outcome {
                response.close();
            }
            return Err(TransportError::closed());
        }
        outcome
    }

    /// Close the wrapped transport. Only the first call has an effect; calls
    /// waiting to retry return a `Closed` error.
    pub fn close(&self) {
        if self.signal.close() {
            self.inner.close();
            tracing::info!("retry transport closed");
        }
    }
}

impl<T: Transport> Transport for RetryTransport<T> {
    type Response = T::Response;

    fn send(&self, request: &Request) -> Result<Self::Response, TransportError> {
        RetryTransport::send(self, request)
    }

    fn close(&self) {
        RetryTransport::close(self)
    }
}
