//! Retry policy for backend calls.
//!
//! [`RetryPolicy`] is the single tunable for per-attempt timeouts, retry
//! counts and the backoff curve. The backend client applies it to transient
//! failures; the strategy runner reuses its backoff between credentials.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-call retry and timeout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt, for retryable failures only.
    pub max_retries: u32,
    /// Backoff before the first retry; doubles for each further retry.
    pub base_backoff: Duration,
    /// Upper bound on a single backoff sleep.
    pub max_backoff: Duration,
    /// Hard timeout for one backend attempt.
    pub attempt_timeout: Duration,
    /// Fraction of each backoff that is randomized, in [0, 1].
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            attempt_timeout: Duration::from_secs(60),
            jitter: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries, handy for tests.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Un-jittered backoff before retry number `retry` (0-based).
    pub fn nominal_backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.min(16));
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Jittered backoff before retry number `retry` (0-based).
    ///
    /// The result lies in `[nominal * (1 - jitter), nominal]`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let nominal = self.nominal_backoff(retry);
        let jitter = self.jitter.clamp(0.0, 1.0);
        if jitter == 0.0 || nominal.is_zero() {
            return nominal;
        }
        let scale = rand::thread_rng().gen_range((1.0 - jitter)..=1.0);
        nominal.mul_f64(scale)
    }
}
