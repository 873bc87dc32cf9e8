//! The attempt loop's decision step, shared by the blocking and async drivers.

use std::time::Duration;

use super::error::TransportError;
use super::policy::RetryPolicy;
use crate::http::Response;

/// Where a call is in its attempt loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    Attempting,
    Waiting,
    Succeeded,
    Failed,
}

/// What the driver must do after an attempt.
#[derive(Debug)]
pub enum RetryDecision<R> {
    /// Hand this outcome to the caller.
    Finish(Result<R, TransportError>),
    /// Wait `delay`, then attempt again with `policy`.
    ///
    /// Any response from the attempt has already been closed.
    RetryAfter { policy: RetryPolicy, delay: Duration },
}

impl<R> RetryDecision<R> {
    pub fn state(&self) -> AttemptState {
        match self {
            RetryDecision::Finish(Ok(_)) => AttemptState::Succeeded,
            RetryDecision::Finish(Err(_)) => AttemptState::Failed,
            RetryDecision::RetryAfter { .. } => AttemptState::Waiting,
        }
    }
}

/// Decide what follows an attempt made under `policy`.
///
/// A retryable response is closed here (after its `Retry-After` hint has
/// been read), so the driver never holds a response while waiting.
pub fn decide<R: Response>(
    policy: &RetryPolicy,
    outcome: Result<R, TransportError>,
) -> RetryDecision<R> {
    match outcome {
        Ok(response) => {
            if policy.is_exhausted() || !policy.is_retryable_response(&response) {
                return RetryDecision::Finish(Ok(response));
            }
            let status = response.status();
            let next = policy.increment();
            let delay = next.next_delay(Some(&response));
            response.close();
            tracing::debug!(
                attempt = next.attempts_made(),
                total = next.total(),
                status,
                delay_ms = delay.as_millis() as u64,
                "retrying after retryable status"
            );
            RetryDecision::RetryAfter {
                policy: next,
                delay,
            }
        }
        Err(err) => {
            if policy.is_exhausted() || !policy.is_retryable_error(&err) {
                return RetryDecision::Finish(Err(err));
            }
            let next = policy.increment();
            let delay = next.next_delay::<R>(None);
            tracing::debug!(
                attempt = next.attempts_made(),
                total = next.total(),
                kind = %err.kind(),
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "retrying after transport error"
            );
            RetryDecision::RetryAfter {
                policy: next,
                delay,
            }
        }
    }
}
