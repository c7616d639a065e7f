//! Request entity

use super::error::DomainError;
use super::problem::Problem;
use super::strategy::StrategyId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Maximum number of strategies fanned out for one request
pub const MAX_STRATEGIES: usize = 5;

/// Process-unique request identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocate the next identifier
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// One reasoning request submitted to the consensus engine
///
/// Immutable once built. The strategy set order is significant: it is the
/// tie-break order used by the arbiter.
///
/// # Example
///
/// ```
/// use quorum_domain::{Problem, Request, StrategyId};
/// use std::time::Duration;
///
/// let request = Request::new(
///     Problem::try_new("Which option shows NGP?").unwrap(),
///     vec![StrategyId::Systematic, StrategyId::KeyDifference],
///     Duration::from_secs(90),
/// )
/// .unwrap();
///
/// assert_eq!(request.strategy_set().len(), 2);
/// assert_eq!(request.position_of(&StrategyId::KeyDifference), Some(1));
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    problem: Problem,
    strategy_set: Vec<StrategyId>,
    deadline: Duration,
}

impl Request {
    /// Build a request, validating the strategy set and deadline.
    ///
    /// `deadline` is the overall time budget, measured from the moment the
    /// request is handed to the coordinator.
    pub fn new(
        problem: Problem,
        strategy_set: Vec<StrategyId>,
        deadline: Duration,
    ) -> Result<Self, DomainError> {
        if strategy_set.is_empty() {
            return Err(DomainError::EmptyStrategySet);
        }
        if strategy_set.len() > MAX_STRATEGIES {
            return Err(DomainError::TooManyStrategies {
                count: strategy_set.len(),
                max: MAX_STRATEGIES,
            });
        }
        for (i, strategy) in strategy_set.iter().enumerate() {
            if strategy.is_synthesis() {
                return Err(DomainError::InvalidStrategy(format!(
                    "'{}' runs after arbitration and cannot be requested",
                    strategy
                )));
            }
            if strategy_set[..i].contains(strategy) {
                return Err(DomainError::DuplicateStrategy(strategy.to_string()));
            }
        }
        if deadline.is_zero() {
            return Err(DomainError::ZeroDeadline);
        }

        Ok(Self {
            id: RequestId::next(),
            problem,
            strategy_set,
            deadline,
        })
    }

    /// Single-strategy variant of this request (fast mode).
    ///
    /// Keeps only the first configured strategy.
    pub fn into_fast(mut self) -> Self {
        self.strategy_set.truncate(1);
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn strategy_set(&self) -> &[StrategyId] {
        &self.strategy_set
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Position of a strategy in the configured order
    pub fn position_of(&self, strategy: &StrategyId) -> Option<usize> {
        self.strategy_set.iter().position(|s| s == strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem() -> Problem {
        Problem::try_new("Rank the leaving groups").unwrap()
    }

    #[test]
    fn test_empty_strategy_set_rejected() {
        let result = Request::new(problem(), vec![], Duration::from_secs(10));
        assert_eq!(result.unwrap_err(), DomainError::EmptyStrategySet);
    }

    #[test]
    fn test_too_many_strategies_rejected() {
        let strategies = (0..6)
            .map(|i| StrategyId::Custom(format!("s{}", i)))
            .collect();
        let result = Request::new(problem(), strategies, Duration::from_secs(10));
        assert_eq!(
            result.unwrap_err(),
            DomainError::TooManyStrategies { count: 6, max: 5 }
        );
    }

    #[test]
    fn test_duplicate_strategy_rejected() {
        let result = Request::new(
            problem(),
            vec![StrategyId::Systematic, StrategyId::Systematic],
            Duration::from_secs(10),
        );
        assert_eq!(
            result.unwrap_err(),
            DomainError::DuplicateStrategy("systematic".to_string())
        );
    }

    #[test]
    fn test_synthesis_cannot_be_requested() {
        let result = Request::new(
            problem(),
            vec![StrategyId::Systematic, StrategyId::Synthesis],
            Duration::from_secs(10),
        );
        assert!(matches!(result, Err(DomainError::InvalidStrategy(_))));
    }

    #[test]
    fn test_zero_deadline_rejected() {
        let result = Request::new(problem(), vec![StrategyId::Systematic], Duration::ZERO);
        assert_eq!(result.unwrap_err(), DomainError::ZeroDeadline);
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = Request::new(problem(), vec![StrategyId::Systematic], Duration::from_secs(1))
            .unwrap();
        let b = Request::new(problem(), vec![StrategyId::Systematic], Duration::from_secs(1))
            .unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_into_fast_keeps_first_strategy() {
        let request = Request::new(
            problem(),
            StrategyId::default_set(),
            Duration::from_secs(30),
        )
        .unwrap()
        .into_fast();

        assert_eq!(request.strategy_set(), &[StrategyId::Systematic]);
    }
}
