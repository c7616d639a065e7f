//! Engine configuration.
//!
//! [`EngineConfig`] groups the parameters the debate coordinator and the
//! strategy runners need. It is built by the infrastructure config loader
//! and handed to the use cases; nothing here is mutable at runtime.

use super::{PoolPolicy, RetryPolicy};
use quorum_domain::{DEFAULT_DISAGREEMENT_PENALTY, MAX_STRATEGIES, QuorumRule};
use serde::{Deserialize, Serialize};

/// Coordinator and runner parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Strategy runners allowed in flight at once.
    pub max_concurrency: usize,
    /// Quorum needed to avoid a degraded verdict.
    pub quorum_rule: QuorumRule,
    /// Confidence multiplier for a non-unanimous majority.
    pub disagreement_penalty: f64,
    /// Resolve with the first strategy only.
    pub fast: bool,
    /// Run the advisory synthesis round when `Ok` answers disagree.
    pub synthesis: bool,
    /// Credential attempts per strategy (first try included).
    pub runner_attempts: u32,
    pub retry: RetryPolicy,
    pub pool: PoolPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: MAX_STRATEGIES,
            quorum_rule: QuorumRule::default(),
            disagreement_penalty: DEFAULT_DISAGREEMENT_PENALTY,
            fast: false,
            synthesis: true,
            runner_attempts: 3,
            retry: RetryPolicy::default(),
            pool: PoolPolicy::default(),
        }
    }
}

impl EngineConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_synthesis(mut self, synthesis: bool) -> Self {
        self.synthesis = synthesis;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pool(mut self, pool: PoolPolicy) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_disagreement_penalty(mut self, penalty: f64) -> Self {
        self.disagreement_penalty = penalty;
        self
    }

    /// Concurrency actually used: at least one, at most the strategy limit.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.clamp(1, MAX_STRATEGIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_concurrency, 5);
        assert_eq!(config.runner_attempts, 3);
        assert!(!config.fast);
        assert!(config.synthesis);
        assert_eq!(config.quorum_rule, QuorumRule::Half);
    }

    #[test]
    fn test_effective_concurrency_is_clamped() {
        assert_eq!(EngineConfig::default().with_max_concurrency(0).effective_concurrency(), 1);
        assert_eq!(EngineConfig::default().with_max_concurrency(64).effective_concurrency(), 5);
        assert_eq!(EngineConfig::default().with_max_concurrency(2).effective_concurrency(), 2);
    }
}
