//! Credential health policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thresholds and cooldown curve for the credential pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPolicy {
    /// Consecutive failures after which a credential is exhausted.
    pub failure_threshold: u32,
    /// Cooldown after the first quota/auth failure.
    pub cooldown_base: Duration,
    /// Longest cooldown.
    pub cooldown_cap: Duration,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown_base: Duration::from_secs(30),
            cooldown_cap: Duration::from_secs(600),
        }
    }
}

impl PoolPolicy {
    /// Cooldown after `consecutive_failures` failures in a row (1-based).
    pub fn cooldown_for(&self, consecutive_failures: u32) -> Duration {
        let doublings = consecutive_failures.saturating_sub(1).min(16);
        self.cooldown_base
            .saturating_mul(2u32.saturating_pow(doublings))
            .min(self.cooldown_cap)
    }
}
