//! Backend failure taxonomy

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of a failed call to the reasoning backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The attempt did not complete within its timeout
    Timeout,
    /// The credential hit a quota or rate limit
    RateLimited,
    /// The credential was rejected
    AuthError,
    /// The backend answered, but not in the agreed shape
    Malformed,
    /// Transport or server failure of unknown cause
    Unknown,
}

impl FailureKind {
    /// Whether the backend adapter may retry this failure with the same credential.
    ///
    /// `RateLimited` is not retried here: the strategy runner moves on to
    /// another credential instead.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::Unknown)
    }

    /// Whether this failure says something about the credential itself.
    pub fn is_credential_fault(&self) -> bool {
        matches!(self, FailureKind::RateLimited | FailureKind::AuthError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::RateLimited => "rate_limited",
            FailureKind::AuthError => "auth_error",
            FailureKind::Malformed => "malformed",
            FailureKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A failed backend call
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct BackendFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl BackendFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimited, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(FailureKind::AuthError, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Malformed, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
