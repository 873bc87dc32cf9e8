//! Retry and backoff policy.
//!
//! This module holds the retry configuration ([`RetryPolicy`]), error
//! classification ([`ErrorKind`]), backoff strategies and the decision step
//! that both retrying transports run after every attempt.

mod backoff;
mod classify;
mod error;
mod policy;
mod retry_after;
mod run;

pub use backoff::{BackoffStrategy, ConstantBackoff, ExponentialBackoff};
pub use classify::{classify_curl_error, from_curl_error};
pub use error::{ErrorKind, PolicyError, TransportError};
pub use policy::{
    default_retry_on, RetryPolicy, RetryPolicyBuilder, DEFAULT_ALLOWED_METHODS,
    DEFAULT_STATUS_FORCELIST,
};
pub use retry_after::parse_retry_after;
pub use run::{decide, AttemptState, RetryDecision};
