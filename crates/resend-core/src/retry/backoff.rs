//! Backoff strategies: how long to wait before retry number `attempts_made`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Computes the wait before the next attempt from the number of retries
/// already scheduled. Implement this to replace the default exponential
/// backoff without touching the transports.
pub trait BackoffStrategy: fmt::Debug + Send + Sync {
    fn compute_delay(&self, attempts_made: u32) -> Duration;

    /// Independent copy for one top-level call, for strategies that carry
    /// state (an RNG) between delays. `None` shares `self` across calls.
    fn fresh(&self) -> Option<Arc<dyn BackoffStrategy>> {
        None
    }
}

/// Exponential backoff with configurable jitter.
///
/// `backoff = factor * 2^attempts`, clamped to `[0, max_wait]`, then a value
/// is drawn uniformly from `[backoff * (1 - jitter), backoff]`.
pub struct ExponentialBackoff {
    factor: f64,
    max_wait: f64,
    jitter: f64,
    seed: Option<u64>,
    rng: Mutex<StdRng>,
}

impl ExponentialBackoff {
    /// Seconds-based parameters; callers validate ranges (see `RetryPolicyBuilder`).
    pub fn new(factor: f64, max_wait: f64, jitter: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            factor,
            max_wait,
            jitter,
            seed,
            rng: Mutex::new(rng),
        }
    }

    /// Upper bound for the given attempt, before jitter.
    pub fn ceiling(&self, attempts_made: u32) -> f64 {
        if self.factor <= 0.0 {
            return 0.0;
        }
        let exp = 2f64.powi(attempts_made.min(i32::MAX as u32) as i32);
        (self.factor * exp).clamp(0.0, self.max_wait)
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn compute_delay(&self, attempts_made: u32) -> Duration {
        let backoff = self.ceiling(attempts_made);
        if backoff <= 0.0 {
            return Duration::ZERO;
        }
        let low = backoff * (1.0 - self.jitter);
        let secs = if self.jitter <= 0.0 || low >= backoff {
            backoff
        } else {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.gen_range(low..=backoff)
        };
        Duration::from_secs_f64(secs)
    }

    /// A seeded strategy restarts its sequence; an unseeded one reseeds
    /// from entropy.
    fn fresh(&self) -> Option<Arc<dyn BackoffStrategy>> {
        Some(Arc::new(Self::new(
            self.factor,
            self.max_wait,
            self.jitter,
            self.seed,
        )))
    }
}

impl fmt::Debug for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExponentialBackoff")
            .field("factor", &self.factor)
            .field("max_wait", &self.max_wait)
            .field("jitter", &self.jitter)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

/// Same delay for every retry.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBackoff(pub Duration);

impl BackoffStrategy for ConstantBackoff {
    fn compute_delay(&self, _attempts_made: u32) -> Duration {
        self.0
    }
}
