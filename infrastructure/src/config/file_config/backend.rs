//! Backend configuration from TOML (`[backend]` section)

use quorum_application::RetryPolicy;
use quorum_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw reasoning backend configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBackendConfig {
    /// API root, without the `/models/...` suffix
    pub base_url: String,
    /// Model name, e.g. `gemini-2.0-flash`
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Hard timeout for one backend attempt
    pub attempt_timeout_seconds: u64,
    /// Retries for timeouts and transient transport failures
    pub max_retries: u32,
    /// Backoff before the first retry
    pub backoff_base_ms: u64,
}

impl Default for FileBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.7,
            max_output_tokens: 2048,
            attempt_timeout_seconds: 60,
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }
}

impl FileBackendConfig {
    pub fn to_retry_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut attempt_timeout = self.attempt_timeout_seconds;
        if attempt_timeout == 0 {
            attempt_timeout = Self::default().attempt_timeout_seconds;
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "backend.attempt_timeout_seconds".to_string(),
                },
                format!(
                    "backend.attempt_timeout_seconds must be positive, using {}",
                    attempt_timeout
                ),
            ));
        }

        let policy = RetryPolicy::default()
            .with_max_retries(self.max_retries)
            .with_base_backoff(Duration::from_millis(self.backoff_base_ms))
            .with_attempt_timeout(Duration::from_secs(attempt_timeout));
        (policy, issues)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.to_retry_policy().1;
        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "backend.model".to_string(),
                },
                "backend.model cannot be empty",
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "backend.base_url".to_string(),
                },
                format!("backend.base_url is not an http(s) URL: '{}'", self.base_url),
            ));
        }
        issues
    }
}
