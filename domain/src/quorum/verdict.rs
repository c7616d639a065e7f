//! Verdict types
//!
//! A [`Verdict`] is the single adjudicated outcome of a request. It is
//! created once and never mutated; the coordinator may attach an advisory
//! synthesis result before handing it out.

use super::result::{StrategyResult, StrategyStatus};
use crate::answer::NormalizedAnswer;
use crate::core::strategy::StrategyId;
use serde::{Deserialize, Serialize};

/// How the verdict was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    /// Every `Ok` result agreed
    Unanimous,
    /// One answer group was strictly larger than the rest
    Majority,
    /// Several groups tied for largest; broken by strategy order
    Split,
    /// Fewer `Ok` results than the quorum
    Degraded,
}

impl VerdictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictKind::Unanimous => "unanimous",
            VerdictKind::Majority => "majority",
            VerdictKind::Split => "split",
            VerdictKind::Degraded => "degraded",
        }
    }
}

impl std::fmt::Display for VerdictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The answer carried by a verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictAnswer {
    /// Chosen by arbitration over `Ok` results
    Adjudicated(NormalizedAnswer),
    /// Best-effort raw text from a non-`Ok` result, passed through as-is
    Unadjudicated {
        strategy: StrategyId,
        raw_text: String,
    },
    /// Nothing usable came back
    Unavailable,
}

impl VerdictAnswer {
    /// Canonical value of an adjudicated answer
    pub fn value(&self) -> Option<&str> {
        match self {
            VerdictAnswer::Adjudicated(answer) => Some(&answer.value),
            _ => None,
        }
    }

    /// Text to show the caller
    pub fn display_text(&self) -> &str {
        match self {
            VerdictAnswer::Adjudicated(answer) => &answer.display,
            VerdictAnswer::Unadjudicated { raw_text, .. } => raw_text,
            VerdictAnswer::Unavailable => "",
        }
    }
}

/// Strategies that produced the same canonical answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub value: String,
    pub strategies: Vec<StrategyId>,
}

impl VoteTally {
    pub fn count(&self) -> usize {
        self.strategies.len()
    }
}

/// The adjudicated result of one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub answer: VerdictAnswer,
    pub kind: VerdictKind,
    /// In [0, 1]
    pub confidence: f64,
    /// Share of `Ok` results in the winning group, in [0, 1]
    pub agreement: f64,
    /// Strategies in the winning group, in strategy order
    pub concurring: Vec<StrategyId>,
    /// Number of `Ok` results
    pub ok_count: usize,
    /// Number of strategies in the request
    pub total: usize,
    /// `Ok` results needed to avoid a degraded verdict
    pub quorum: usize,
    /// Answer groups, in order of first appearance
    pub votes: Vec<VoteTally>,
    /// Every result outside the winning group, in strategy order
    pub dissent: Vec<StrategyResult>,
    pub degraded: bool,
    /// Arbitrator review of disagreeing answers. Advisory only: `answer`
    /// and `confidence` always come from arbitration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<StrategyResult>,
}

impl Verdict {
    /// Number of strategies that concurred on the answer
    pub fn agreement_count(&self) -> usize {
        self.concurring.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Whether at least two `Ok` results gave different answers
    pub fn is_contested(&self) -> bool {
        self.votes.len() > 1
    }

    pub fn with_synthesis(mut self, synthesis: StrategyResult) -> Self {
        self.synthesis = Some(synthesis);
        self
    }

    /// Whether a successful synthesis reached the arbitrated answer.
    ///
    /// `None` without a synthesis answer.
    pub fn synthesis_concurs(&self) -> Option<bool> {
        let synthesized = self.synthesis.as_ref()?.answer.as_ref()?;
        Some(self.answer.value() == Some(synthesized.value.as_str()))
    }

    /// Visual summary, e.g. `[●●○✕]`: concurring, dissenting `Ok`, failed
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for _ in &self.concurring {
            summary.push('●');
        }
        for result in &self.dissent {
            summary.push(if result.status == StrategyStatus::Ok {
                '○'
            } else {
                '✕'
            });
        }
        summary.push(']');
        summary
    }

    /// Dissenting results that failed rather than disagreed
    pub fn failures(&self) -> impl Iterator<Item = &StrategyResult> {
        self.dissent.iter().filter(|r| !r.is_ok())
    }
}
