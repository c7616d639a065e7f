//! Quorum consensus domain
//!
//! Strategy results, verdicts and the pure arbiter that turns the former
//! into the latter.
//!
//! # Arbitration
//!
//! ```text
//! results ──► filter Ok ──► group by canonical answer ──► largest group wins
//!                │                                          (ties: earliest
//!                │ none Ok                                   strategy)
//!                ▼
//!        degraded verdict, least malformed raw text passed through
//! ```
//!
//! `agreement = |winning group| / |Ok results|`; confidence equals agreement,
//! scaled by a penalty when at least two `Ok` results disagree. A verdict is
//! degraded when fewer `Ok` results than the [`QuorumRule`] requires came back.

pub mod arbiter;
pub mod result;
pub mod rule;
pub mod verdict;

// Re-export main types
pub use arbiter::{Arbiter, DEFAULT_DISAGREEMENT_PENALTY};
pub use result::{StrategyResult, StrategyStatus};
pub use rule::QuorumRule;
pub use verdict::{Verdict, VerdictAnswer, VerdictKind, VoteTally};
