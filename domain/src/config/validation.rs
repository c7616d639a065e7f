//! Configuration validation issues.
//!
//! Config loaders report problems as structured [`ConfigIssue`]s instead of
//! failing outright, so a bad optional value degrades to its default with a
//! warning while a fatal one stops startup.
//!
//! # Examples
//!
//! ```
//! use quorum_domain::config::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issue = ConfigIssue::warning(
//!     ConfigIssueCode::InvalidEnumValue {
//!         field: "output.format".to_string(),
//!         value: "yaml".to_string(),
//!     },
//!     "unknown output format 'yaml', using default",
//! );
//! assert_eq!(issue.severity, Severity::Warning);
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A string field holds a value outside its known set.
    InvalidEnumValue { field: String, value: String },
    /// A numeric field is outside its allowed range.
    OutOfRange { field: String },
    /// No credential tokens were configured.
    NoCredentials,
    /// The same token is configured more than once.
    DuplicateCredential,
    /// The same strategy is listed twice.
    DuplicateStrategy { strategy: String },
    /// More strategies than a request may carry.
    TooManyStrategies { count: usize },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
