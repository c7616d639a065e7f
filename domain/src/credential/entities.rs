//! Credential value objects

use crate::core::failure::FailureKind;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Stable, non-secret credential identifier (safe to log)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CredentialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A backend credential: identifier plus secret token
///
/// `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    id: CredentialId,
    token: String,
}

impl Credential {
    pub fn new(id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: CredentialId::new(id),
            token: token.into(),
        }
    }

    pub fn id(&self) -> &CredentialId {
        &self.id
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Health state of a credential
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CredentialHealth {
    #[default]
    Healthy,
    /// Skipped until `until`; clears itself on the first check after expiry
    Cooldown { until: Instant },
    /// Skipped until process restart or an explicit reset
    Exhausted,
}

impl CredentialHealth {
    /// Whether the credential may be handed out at `now`
    pub fn is_usable_at(&self, now: Instant) -> bool {
        match self {
            CredentialHealth::Healthy => true,
            CredentialHealth::Cooldown { until } => *until <= now,
            CredentialHealth::Exhausted => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialHealth::Healthy => "healthy",
            CredentialHealth::Cooldown { .. } => "cooldown",
            CredentialHealth::Exhausted => "exhausted",
        }
    }
}

/// What happened during one borrow of a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    /// The backend accepted the credential
    Success,
    /// Quota or authentication failure: the credential cools down
    QuotaOrAuth,
    /// Transport failure or timeout: counted, state unchanged
    Transport,
    /// The borrow was abandoned before the call finished (cancellation)
    Abandoned,
}

impl CallOutcome {
    /// Outcome to report for a failed call.
    ///
    /// A malformed reply still means the backend accepted the credential.
    pub fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::RateLimited | FailureKind::AuthError => CallOutcome::QuotaOrAuth,
            FailureKind::Timeout | FailureKind::Unknown => CallOutcome::Transport,
            FailureKind::Malformed => CallOutcome::Success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::new("key-1", "AIza-secret");
        let debug = format!("{:?}", credential);
        assert!(debug.contains("key-1"));
        assert!(!debug.contains("AIza-secret"));
    }

    #[test]
    fn test_health_usability() {
        let now = Instant::now();
        assert_eq!(CredentialHealth::default(), CredentialHealth::Healthy);
        assert!(CredentialHealth::Healthy.is_usable_at(now));
        assert!(!CredentialHealth::Exhausted.is_usable_at(now));

        let cooling = CredentialHealth::Cooldown {
            until: now + Duration::from_secs(30),
        };
        assert!(!cooling.is_usable_at(now));
        assert!(cooling.is_usable_at(now + Duration::from_secs(30)));
    }

    #[test]
    fn test_outcome_from_failure() {
        assert_eq!(
            CallOutcome::from_failure(FailureKind::RateLimited),
            CallOutcome::QuotaOrAuth
        );
        assert_eq!(
            CallOutcome::from_failure(FailureKind::AuthError),
            CallOutcome::QuotaOrAuth
        );
        assert_eq!(
            CallOutcome::from_failure(FailureKind::Timeout),
            CallOutcome::Transport
        );
        assert_eq!(
            CallOutcome::from_failure(FailureKind::Malformed),
            CallOutcome::Success
        );
    }
}
