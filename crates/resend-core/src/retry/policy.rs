use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::backoff::{BackoffStrategy, ExponentialBackoff};
use super::error::{ErrorKind, PolicyError, TransportError};
use super::retry_after;
use crate::http::Response;

/// Methods retried by default (the idempotent ones).
pub const DEFAULT_ALLOWED_METHODS: [&str; 6] = ["HEAD", "GET", "PUT", "DELETE", "OPTIONS", "TRACE"];

/// Status codes retried by default.
pub const DEFAULT_STATUS_FORCELIST: [u16; 4] = [429, 502, 503, 504];

/// Error kinds retried by default.
pub fn default_retry_on() -> Vec<ErrorKind> {
    vec![ErrorKind::Timeout, ErrorKind::Network, ErrorKind::RemoteProtocol]
}

/// Retry configuration plus the number of retries scheduled so far.
///
/// The value is cheap to clone. [`RetryPolicy::increment`] returns a new
/// policy instead of mutating, so each call through a transport threads its
/// own counter and a policy can be shared freely.
#[derive(Clone)]
pub struct RetryPolicy {
    total: u32,
    attempts_made: u32,
    backoff_factor: f64,
    max_backoff_wait: f64,
    jitter: f64,
    respect_retry_after_header: bool,
    status_forcelist: Arc<BTreeSet<u16>>,
    allowed_methods: Arc<BTreeSet<String>>,
    retry_on: Arc<[ErrorKind]>,
    backoff: Arc<dyn BackoffStrategy>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build_unchecked()
    }
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::default()
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn max_backoff_wait(&self) -> f64 {
        self.max_backoff_wait
    }

    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    pub fn respect_retry_after_header(&self) -> bool {
        self.respect_retry_after_header
    }

    pub fn status_forcelist(&self) -> impl Iterator<Item = u16> + '_ {
        self.status_forcelist.iter().copied()
    }

    pub fn allowed_methods(&self) -> impl Iterator<Item = &str> + '_ {
        self.allowed_methods.iter().map(String::as_str)
    }

    pub fn retry_on(&self) -> &[ErrorKind] {
        &self.retry_on
    }

    pub fn is_retryable_method(&self, method: &str) -> bool {
        self.allowed_methods
            .contains(method.trim().to_ascii_uppercase().as_str())
    }

    pub fn is_retryable_status_code(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    pub fn is_retryable_response<R: Response>(&self, response: &R) -> bool {
        self.is_retryable_status_code(response.status())
    }

    /// True if the error's kind is, or descends from, a configured kind.
    pub fn is_retryable_error(&self, error: &TransportError) -> bool {
        self.retry_on.iter().any(|kind| error.kind().is_a(kind))
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.total
    }

    /// urllib3-style predicate: a retry budget exists, the method and status
    /// are retryable, and the server sent no `Retry-After`.
    ///
    /// The drivers do not use this; they follow `Retry-After` instead.
    pub fn is_retry(&self, method: &str, status: u16, has_retry_after: bool) -> bool {
        self.total > 0
            && self.is_retryable_method(method)
            && self.is_retryable_status_code(status)
            && !has_retry_after
    }

    /// Same configuration with one more retry recorded.
    #[must_use]
    pub fn increment(&self) -> Self {
        Self {
            attempts_made: self.attempts_made.saturating_add(1),
            ..self.clone()
        }
    }

    /// Same configuration with the counter back at zero, as the working
    /// copy for a new top-level call. Stateful backoff (the jitter RNG) is
    /// replaced with a fresh instance so calls never share a sequence.
    #[must_use]
    pub fn reset(&self) -> Self {
        let backoff = self
            .backoff
            .fresh()
            .unwrap_or_else(|| Arc::clone(&self.backoff));
        Self {
            attempts_made: 0,
            backoff,
            ..self.clone()
        }
    }

    /// Wait before the next attempt.
    ///
    /// A usable `Retry-After` hint on `response` wins when enabled; otherwise
    /// the backoff strategy decides.
    pub fn next_delay<R: Response>(&self, response: Option<&R>) -> Duration {
        if let Some(delay) = response.and_then(|r| self.retry_after_hint(r)) {
            return delay;
        }
        self.backoff.compute_delay(self.attempts_made)
    }

    fn retry_after_hint<R: Response>(&self, response: &R) -> Option<Duration> {
        if !self.respect_retry_after_header {
            return None;
        }
        let value = response.header("Retry-After")?;
        let hint = retry_after::parse_retry_after(value, Utc::now());
        if hint.is_none() {
            tracing::warn!(retry_after = value, "ignoring unusable Retry-After header");
        }
        hint
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("total", &self.total)
            .field("attempts_made", &self.attempts_made)
            .field("backoff_factor", &self.backoff_factor)
            .field("max_backoff_wait", &self.max_backoff_wait)
            .field("jitter", &self.jitter)
            .field("respect_retry_after_header", &self.respect_retry_after_header)
            .field("status_forcelist", &self.status_forcelist)
            .field("allowed_methods", &self.allowed_methods)
            .field("retry_on", &self.retry_on)
            .field("backoff", &self.backoff)
            .finish()
    }
}

/// Builder for [`RetryPolicy`]. Defaults: 10 retries, no backoff, 120s cap,
/// full jitter, `Retry-After` respected.
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    total: u32,
    backoff_factor: f64,
    max_backoff_wait: f64,
    jitter: f64,
    respect_retry_after_header: bool,
    status_forcelist: BTreeSet<u16>,
    allowed_methods: BTreeSet<String>,
    retry_on: Vec<ErrorKind>,
    seed: Option<u64>,
    backoff: Option<Arc<dyn BackoffStrategy>>,
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self {
            total: 10,
            backoff_factor: 0.0,
            max_backoff_wait: 120.0,
            jitter: 1.0,
            respect_retry_after_header: true,
            status_forcelist: DEFAULT_STATUS_FORCELIST.into_iter().collect(),
            allowed_methods: DEFAULT_ALLOWED_METHODS.iter().map(|m| m.to_string()).collect(),
            retry_on: default_retry_on(),
            seed: None,
            backoff: None,
        }
    }
}

impl RetryPolicyBuilder {
    pub fn total(mut self, total: u32) -> Self {
        self.total = total;
        self
    }

    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    pub fn max_backoff_wait(mut self, secs: f64) -> Self {
        self.max_backoff_wait = secs;
        self
    }

    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn respect_retry_after_header(mut self, respect: bool) -> Self {
        self.respect_retry_after_header = respect;
        self
    }

    /// Replaces the retryable status codes. Any `u16` is accepted.
    pub fn status_forcelist(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.status_forcelist = codes.into_iter().collect();
        self
    }

    /// Replaces the retryable methods (case-insensitive).
    pub fn allowed_methods<S: AsRef<str>>(mut self, methods: impl IntoIterator<Item = S>) -> Self {
        self.allowed_methods = methods
            .into_iter()
            .map(|m| m.as_ref().trim().to_ascii_uppercase())
            .collect();
        self
    }

    /// Replaces the retryable error kinds.
    pub fn retry_on(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retry_on = kinds.into_iter().collect();
        self
    }

    /// Seed for the jitter RNG of the default backoff.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use a custom strategy instead of exponential backoff.
    pub fn backoff_strategy(mut self, strategy: Arc<dyn BackoffStrategy>) -> Self {
        self.backoff = Some(strategy);
        self
    }

    pub fn build(self) -> Result<RetryPolicy, PolicyError> {
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(PolicyError::BackoffFactor(self.backoff_factor));
        }
        if !self.max_backoff_wait.is_finite() || self.max_backoff_wait < 0.0 {
            return Err(PolicyError::MaxBackoffWait(self.max_backoff_wait));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(PolicyError::Jitter(self.jitter));
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> RetryPolicy {
        let backoff = self.backoff.unwrap_or_else(|| {
            Arc::new(ExponentialBackoff::new(
                self.backoff_factor,
                self.max_backoff_wait,
                self.jitter,
                self.seed,
            ))
        });
        RetryPolicy {
            total: self.total,
            attempts_made: 0,
            backoff_factor: self.backoff_factor,
            max_backoff_wait: self.max_backoff_wait,
            jitter: self.jitter,
            respect_retry_after_header: self.respect_retry_after_header,
            status_forcelist: Arc::new(self.status_forcelist),
            allowed_methods: Arc::new(self.allowed_methods),
            retry_on: self.retry_on.into(),
            backoff,
        }
    }
}
