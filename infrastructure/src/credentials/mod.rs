//! Credential loading
//!
//! Keys come from `credentials.keys` followed by the comma-separated
//! environment variable named by `credentials.keys_env`. Identifiers are
//! positional (`key-1`, `key-2`, ...) so logs never carry a token.

use crate::config::FileCredentialsConfig;
use quorum_domain::{ConfigIssue, ConfigIssueCode, Credential};

/// Load credentials using the process environment
pub fn load_credentials(config: &FileCredentialsConfig) -> (Vec<Credential>, Vec<ConfigIssue>) {
    load_credentials_with(config, |name| std::env::var(name).ok())
}

/// Load credentials with an injectable environment lookup
pub fn load_credentials_with(
    config: &FileCredentialsConfig,
    env: impl Fn(&str) -> Option<String>,
) -> (Vec<Credential>, Vec<ConfigIssue>) {
    let mut issues = Vec::new();

    let from_env = if config.keys_env.is_empty() {
        None
    } else {
        env(&config.keys_env)
    };
    let candidates = config
        .keys
        .iter()
        .map(String::as_str)
        .chain(from_env.iter().flat_map(|raw| raw.split(',')))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let mut tokens: Vec<&str> = Vec::new();
    let mut duplicates = 0;
    for token in candidates {
        if tokens.contains(&token) {
            duplicates += 1;
        } else {
            tokens.push(token);
        }
    }

    if duplicates > 0 {
        issues.push(ConfigIssue::warning(
            ConfigIssueCode::DuplicateCredential,
            format!("{} duplicate API key(s) ignored", duplicates),
        ));
    }

    let credentials: Vec<Credential> = tokens
        .into_iter()
        .enumerate()
        .map(|(i, token)| Credential::new(format!("key-{}", i + 1), token))
        .collect();

    if credentials.is_empty() {
        let hint = if config.keys_env.is_empty() {
            "set credentials.keys".to_string()
        } else {
            format!("set {} or credentials.keys", config.keys_env)
        };
        issues.push(ConfigIssue::error(
            ConfigIssueCode::NoCredentials,
            format!("no API keys configured: {}", hint),
        ));
    }

    (credentials, issues)
}
