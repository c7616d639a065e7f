//! Domain layer for chem-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Strategies
//!
//! A problem is reasoned about independently by several strategies
//! ([`StrategyId`]), each a distinct persona with its own prompt. Every
//! strategy yields exactly one [`StrategyResult`].
//!
//! ## Quorum
//!
//! The [`Arbiter`] groups `Ok` results by canonical answer and returns one
//! [`Verdict`]. Agreement among strategies drives the confidence; a verdict
//! backed by fewer `Ok` results than the [`QuorumRule`] requires is degraded.
//!
//! ## Credentials
//!
//! Backend access is spread over a pool of [`Credential`]s whose
//! [`CredentialHealth`] follows the [`CallOutcome`]s reported for them.

pub mod answer;
pub mod config;
pub mod core;
pub mod credential;
pub mod prompt;
pub mod quorum;
pub mod record;

// Re-export commonly used types
pub use answer::{NormalizedAnswer, ParseError, canonicalize, parse_answer};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{
    error::DomainError,
    failure::{BackendFailure, FailureKind},
    problem::{ImageRef, Problem},
    request::{MAX_STRATEGIES, Request, RequestId},
    strategy::StrategyId,
    string::excerpt,
};
pub use credential::{CallOutcome, Credential, CredentialHealth, CredentialId};
pub use prompt::{Prompt, PromptTemplate};
pub use record::{Record, StrategyRecord, VerdictRecord};

// Re-export quorum types
pub use quorum::{
    Arbiter, DEFAULT_DISAGREEMENT_PENALTY, QuorumRule, StrategyResult, StrategyStatus, Verdict,
    VerdictAnswer, VerdictKind, VoteTally,
};
