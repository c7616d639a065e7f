//! Engine configuration from TOML (`[engine]` section)

use quorum_domain::{
    ConfigIssue, ConfigIssueCode, DEFAULT_DISAGREEMENT_PENALTY, MAX_STRATEGIES, QuorumRule,
    StrategyId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw engine configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEngineConfig {
    /// Strategy identifiers, in tie-break order
    pub strategies: Vec<String>,
    /// Overall budget per request
    pub deadline_seconds: u64,
    /// Strategy runners in flight at once
    pub max_concurrency: usize,
    /// Confidence multiplier for a non-unanimous majority
    pub disagreement_penalty: f64,
    /// Quorum rule: "half", "majority", "unanimous", "atleast:N" or "N%"
    pub quorum: String,
    /// Resolve with the first strategy only
    pub fast: bool,
    /// Ask an arbitrator to review disagreeing answers after arbitration
    pub synthesis: bool,
}

impl Default for FileEngineConfig {
    fn default() -> Self {
        Self {
            strategies: StrategyId::default_set()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            deadline_seconds: 120,
            max_concurrency: MAX_STRATEGIES,
            disagreement_penalty: DEFAULT_DISAGREEMENT_PENALTY,
            quorum: "half".to_string(),
            fast: false,
            synthesis: true,
        }
    }
}

impl FileEngineConfig {
    /// Parse the strategy list.
    ///
    /// Unknown entries and duplicates are dropped with a warning. An empty
    /// result falls back to the default set; too many strategies is an error.
    pub fn parse_strategies(&self) -> (Vec<StrategyId>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut strategies: Vec<StrategyId> = Vec::new();

        for raw in &self.strategies {
            match raw.parse::<StrategyId>() {
                Ok(strategy) if strategy.is_synthesis() => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "engine.strategies".to_string(),
                        value: raw.clone(),
                    },
                    format!(
                        "engine.strategies: '{}' runs after arbitration (see engine.synthesis), ignoring",
                        raw
                    ),
                )),
                Ok(strategy) if strategies.contains(&strategy) => {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::DuplicateStrategy {
                            strategy: strategy.to_string(),
                        },
                        format!("engine.strategies: '{}' listed twice, ignoring repeat", raw),
                    ));
                }
                Ok(strategy) => strategies.push(strategy),
                Err(e) => issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "engine.strategies".to_string(),
                        value: raw.clone(),
                    },
                    format!("engine.strategies: {}, ignoring", e),
                )),
            }
        }

        if strategies.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "engine.strategies".to_string(),
                },
                "engine.strategies: no usable strategy, falling back to the default set",
            ));
            strategies = StrategyId::default_set();
        }

        if strategies.len() > MAX_STRATEGIES {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::TooManyStrategies {
                    count: strategies.len(),
                },
                format!(
                    "engine.strategies: {} strategies configured, at most {} allowed",
                    strategies.len(),
                    MAX_STRATEGIES
                ),
            ));
        }

        (strategies, issues)
    }

    pub fn parse_quorum_rule(&self) -> (QuorumRule, Vec<ConfigIssue>) {
        match self.quorum.parse::<QuorumRule>() {
            Ok(rule) => (rule, vec![]),
            Err(_) => (
                QuorumRule::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "engine.quorum".to_string(),
                        value: self.quorum.clone(),
                    },
                    format!(
                        "engine.quorum: unknown rule '{}', falling back to 'half'",
                        self.quorum
                    ),
                )],
            ),
        }
    }

    pub fn parse_disagreement_penalty(&self) -> (f64, Vec<ConfigIssue>) {
        let penalty = self.disagreement_penalty;
        if (0.0..=1.0).contains(&penalty) {
            return (penalty, vec![]);
        }
        (
            DEFAULT_DISAGREEMENT_PENALTY,
            vec![ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "engine.disagreement_penalty".to_string(),
                },
                format!(
                    "engine.disagreement_penalty: {} is outside [0, 1], using {}",
                    penalty, DEFAULT_DISAGREEMENT_PENALTY
                ),
            )],
        )
    }

    pub fn parse_deadline(&self) -> (Duration, Vec<ConfigIssue>) {
        if self.deadline_seconds == 0 {
            return (
                Duration::from_secs(Self::default().deadline_seconds),
                vec![ConfigIssue::error(
                    ConfigIssueCode::OutOfRange {
                        field: "engine.deadline_seconds".to_string(),
                    },
                    "engine.deadline_seconds must be greater than zero",
                )],
            );
        }
        (Duration::from_secs(self.deadline_seconds), vec![])
    }
}
