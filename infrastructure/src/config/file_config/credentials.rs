//! Credential configuration from TOML (`[credentials]` section)

use quorum_application::PoolPolicy;
use quorum_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw credential configuration from TOML
///
/// Tokens may be listed inline, but keeping them in the environment
/// variable named by `keys_env` is preferred.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCredentialsConfig {
    /// Inline API keys
    pub keys: Vec<String>,
    /// Environment variable holding comma-separated API keys
    pub keys_env: String,
    /// Consecutive failures after which a key is exhausted
    pub failure_threshold: u32,
    pub cooldown_base_seconds: u64,
    pub cooldown_cap_seconds: u64,
}

impl Default for FileCredentialsConfig {
    fn default() -> Self {
        Self {
            keys: vec![],
            keys_env: "GEMINI_API_KEYS".to_string(),
            failure_threshold: 3,
            cooldown_base_seconds: 30,
            cooldown_cap_seconds: 600,
        }
    }
}

impl std::fmt::Debug for FileCredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialsConfig")
            .field("keys", &format_args!("[{} redacted]", self.keys.len()))
            .field("keys_env", &self.keys_env)
            .field("failure_threshold", &self.failure_threshold)
            .field("cooldown_base_seconds", &self.cooldown_base_seconds)
            .field("cooldown_cap_seconds", &self.cooldown_cap_seconds)
            .finish()
    }
}

impl FileCredentialsConfig {
    pub fn to_pool_policy(&self) -> (PoolPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        let failure_threshold = if self.failure_threshold == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "credentials.failure_threshold".to_string(),
                },
                "credentials.failure_threshold must be at least 1, using 1",
            ));
            1
        } else {
            self.failure_threshold
        };

        let base = Duration::from_secs(self.cooldown_base_seconds);
        let mut cap = Duration::from_secs(self.cooldown_cap_seconds);
        if cap < base {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "credentials.cooldown_cap_seconds".to_string(),
                },
                "credentials.cooldown_cap_seconds is below the base cooldown, using the base",
            ));
            cap = base;
        }

        (
            PoolPolicy {
                failure_threshold,
                cooldown_base: base,
                cooldown_cap: cap,
            },
            issues,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let (policy, issues) = FileCredentialsConfig::default().to_pool_policy();
        assert!(issues.is_empty());
        assert_eq!(policy, PoolPolicy::default());
    }

    #[test]
    fn test_zero_threshold_is_raised() {
        let config = FileCredentialsConfig {
            failure_threshold: 0,
            ..Default::default()
        };
        let (policy, issues) = config.to_pool_policy();
        assert_eq!(policy.failure_threshold, 1);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = FileCredentialsConfig {
            keys: vec!["AIza-secret".to_string()],
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("AIza-secret"));
        assert!(debug.contains("1 redacted"));
    }
}
