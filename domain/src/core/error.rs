//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// These are caller contract violations: a request that cannot be built.
/// Partial failure while resolving a request is never an error; it shows up
/// in the verdict instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Problem text cannot be empty")]
    EmptyProblem,

    #[error("Strategy set cannot be empty")]
    EmptyStrategySet,

    #[error("Strategy set has {count} entries, at most {max} are allowed")]
    TooManyStrategies { count: usize, max: usize },

    #[error("Strategy '{0}' appears more than once in the strategy set")]
    DuplicateStrategy(String),

    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error("Deadline must be greater than zero")]
    ZeroDeadline,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::TooManyStrategies { count: 6, max: 5 };
        assert_eq!(
            error.to_string(),
            "Strategy set has 6 entries, at most 5 are allowed"
        );
        assert_eq!(
            DomainError::DuplicateStrategy("systematic".to_string()).to_string(),
            "Strategy 'systematic' appears more than once in the strategy set"
        );
    }
}
