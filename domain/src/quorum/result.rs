//! Strategy results
//!
//! A [`StrategyResult`] is produced by exactly one strategy run and never
//! changes afterwards.

use crate::answer::NormalizedAnswer;
use crate::core::failure::BackendFailure;
use crate::core::strategy::StrategyId;
use crate::credential::CredentialId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal status of a strategy run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    /// A normalized answer was produced
    Ok,
    /// Cut off by the request deadline or cancellation
    Timeout,
    /// The backend could not be reached usefully (after retries)
    BackendError,
    /// The backend answered but the output broke the contract
    ParseError,
}

impl StrategyStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, StrategyStatus::Ok)
    }

    /// Ordering used when no strategy succeeded: lower is closer to an answer.
    pub fn malformation_rank(&self) -> u8 {
        match self {
            StrategyStatus::Ok => 0,
            StrategyStatus::ParseError => 1,
            StrategyStatus::BackendError => 2,
            StrategyStatus::Timeout => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyStatus::Ok => "ok",
            StrategyStatus::Timeout => "timeout",
            StrategyStatus::BackendError => "backend_error",
            StrategyStatus::ParseError => "parse_error",
        }
    }
}

impl std::fmt::Display for StrategyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of running one strategy against one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub strategy: StrategyId,
    pub status: StrategyStatus,
    /// Present iff `status` is `Ok`
    pub answer: Option<NormalizedAnswer>,
    /// Raw backend text, when the backend answered at all
    pub raw_text: Option<String>,
    /// Last backend failure, for `BackendError`
    pub failure: Option<BackendFailure>,
    /// Parser complaint, for `ParseError`
    pub parse_error: Option<String>,
    /// Wall-clock time from start to result, in milliseconds
    pub latency_ms: u64,
    /// Credential used for the final backend call
    pub credential: Option<CredentialId>,
    /// Backend calls made (credential switches included)
    pub attempts: u32,
}

impl StrategyResult {
    fn base(strategy: StrategyId, status: StrategyStatus) -> Self {
        Self {
            strategy,
            status,
            answer: None,
            raw_text: None,
            failure: None,
            parse_error: None,
            latency_ms: 0,
            credential: None,
            attempts: 0,
        }
    }

    pub fn ok(strategy: StrategyId, answer: NormalizedAnswer, raw_text: impl Into<String>) -> Self {
        Self {
            answer: Some(answer),
            raw_text: Some(raw_text.into()),
            ..Self::base(strategy, StrategyStatus::Ok)
        }
    }

    pub fn parse_error(
        strategy: StrategyId,
        raw_text: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            raw_text: Some(raw_text.into()),
            parse_error: Some(error.into()),
            ..Self::base(strategy, StrategyStatus::ParseError)
        }
    }

    /// `failure` is `None` when the backend was never contacted
    pub fn backend_error(strategy: StrategyId, failure: Option<BackendFailure>) -> Self {
        Self {
            failure,
            ..Self::base(strategy, StrategyStatus::BackendError)
        }
    }

    pub fn timeout(strategy: StrategyId) -> Self {
        Self::base(strategy, StrategyStatus::Timeout)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency_ms = latency.as_millis().min(u64::MAX as u128) as u64;
        self
    }

    pub fn with_credential(mut self, credential: Option<CredentialId>) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok() && self.answer.is_some()
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Short reason for a non-`Ok` result
    pub fn failure_summary(&self) -> Option<String> {
        match self.status {
            StrategyStatus::Ok => None,
            StrategyStatus::Timeout => Some("deadline reached".to_string()),
            StrategyStatus::ParseError => Some(
                self.parse_error
                    .clone()
                    .unwrap_or_else(|| "unparsable output".to_string()),
            ),
            StrategyStatus::BackendError => Some(match &self.failure {
                Some(failure) => failure.to_string(),
                None => "no credential available".to_string(),
            }),
        }
    }
}
