//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod backend;
mod credentials;
mod engine;
mod logging;
mod output;

pub use backend::FileBackendConfig;
pub use credentials::FileCredentialsConfig;
pub use engine::FileEngineConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use quorum_application::EngineConfig;
use quorum_domain::{ConfigIssue, StrategyId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Coordinator settings
    pub engine: FileEngineConfig,
    /// Reasoning backend settings
    pub backend: FileBackendConfig,
    /// API keys and their health policy
    pub credentials: FileCredentialsConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log and record destinations
    pub logging: FileLoggingConfig,
}

/// Engine settings resolved from a [`FileConfig`]
#[derive(Debug, Clone)]
pub struct ResolvedEngine {
    pub engine: EngineConfig,
    pub strategies: Vec<StrategyId>,
    pub deadline: Duration,
}

impl FileConfig {
    /// Build the engine configuration, collecting every issue on the way.
    ///
    /// Warnings come with a usable fallback value; callers should refuse to
    /// start when any issue is an error.
    pub fn to_engine_config(&self) -> (ResolvedEngine, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let (strategies, strategy_issues) = self.engine.parse_strategies();
        issues.extend(strategy_issues);
        let (deadline, deadline_issues) = self.engine.parse_deadline();
        issues.extend(deadline_issues);
        let (quorum_rule, rule_issues) = self.engine.parse_quorum_rule();
        issues.extend(rule_issues);
        let (disagreement_penalty, penalty_issues) = self.engine.parse_disagreement_penalty();
        issues.extend(penalty_issues);
        let (retry, retry_issues) = self.backend.to_retry_policy();
        issues.extend(retry_issues);
        let (pool, pool_issues) = self.credentials.to_pool_policy();
        issues.extend(pool_issues);

        let engine = EngineConfig {
            max_concurrency: self.engine.max_concurrency,
            quorum_rule,
            disagreement_penalty,
            fast: self.engine.fast,
            synthesis: self.engine.synthesis,
            retry,
            pool,
            ..EngineConfig::default()
        };

        (
            ResolvedEngine {
                engine,
                strategies,
                deadline,
            },
            issues,
        )
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.to_engine_config().1;
        issues.extend(
            self.backend
                .validate()
                .into_iter()
                .filter(|i| i.is_error()),
        );
        issues
    }
}
