//! Consensus arbiter
//!
//! Pure adjudication over a fixed set of strategy results. No I/O and no
//! clock: the same inputs always yield the same [`Verdict`], whatever order
//! the results completed in.

use super::result::StrategyResult;
use super::rule::QuorumRule;
use super::verdict::{Verdict, VerdictAnswer, VerdictKind, VoteTally};
use crate::answer::NormalizedAnswer;
use crate::core::strategy::StrategyId;

/// Confidence multiplier applied when a majority exists but is not unanimous
pub const DEFAULT_DISAGREEMENT_PENALTY: f64 = 0.7;

/// Computes verdicts from strategy results
///
/// # Example
///
/// ```
/// use quorum_domain::{Arbiter, NormalizedAnswer, StrategyId, StrategyResult};
///
/// let strategies = vec![StrategyId::Systematic, StrategyId::KeyDifference, StrategyId::Mechanistic];
/// let results = vec![
///     StrategyResult::ok(StrategyId::Systematic, NormalizedAnswer::new("X"), "ANSWER: X"),
///     StrategyResult::ok(StrategyId::KeyDifference, NormalizedAnswer::new("X"), "ANSWER: X"),
///     StrategyResult::ok(StrategyId::Mechanistic, NormalizedAnswer::new("Y"), "ANSWER: Y"),
/// ];
///
/// let verdict = Arbiter::default().arbitrate(&strategies, &results);
/// assert_eq!(verdict.answer.value(), Some("X"));
/// assert!(!verdict.degraded);
/// assert!((verdict.confidence - 2.0 / 3.0 * 0.7).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arbiter {
    rule: QuorumRule,
    disagreement_penalty: f64,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self {
            rule: QuorumRule::default(),
            disagreement_penalty: DEFAULT_DISAGREEMENT_PENALTY,
        }
    }
}

struct Group<'a> {
    representative: &'a NormalizedAnswer,
    members: Vec<&'a StrategyResult>,
}

impl Arbiter {
    pub fn new(rule: QuorumRule, disagreement_penalty: f64) -> Self {
        Self {
            rule,
            disagreement_penalty: disagreement_penalty.clamp(0.0, 1.0),
        }
    }

    pub fn rule(&self) -> QuorumRule {
        self.rule
    }

    pub fn disagreement_penalty(&self) -> f64 {
        self.disagreement_penalty
    }

    /// Arbitrate using canonical-value equality
    pub fn arbitrate(&self, strategy_set: &[StrategyId], results: &[StrategyResult]) -> Verdict {
        self.arbitrate_with(strategy_set, results, NormalizedAnswer::agrees_with)
    }

    /// Arbitrate with a custom answer-equality comparator.
    ///
    /// `strategy_set` supplies both the quorum size and the tie-break order.
    pub fn arbitrate_with<F>(
        &self,
        strategy_set: &[StrategyId],
        results: &[StrategyResult],
        same_answer: F,
    ) -> Verdict
    where
        F: Fn(&NormalizedAnswer, &NormalizedAnswer) -> bool,
    {
        let ordered = order_results(strategy_set, results);
        let total = strategy_set.len();
        let quorum = self.rule.required(total);

        let ok: Vec<&StrategyResult> = ordered.iter().copied().filter(|r| r.is_ok()).collect();
        if ok.is_empty() {
            return Self::no_answer_verdict(&ordered, total, quorum);
        }

        let mut groups: Vec<Group<'_>> = Vec::new();
        for result in &ok {
            let Some(answer) = result.answer.as_ref() else {
                continue;
            };
            match groups
                .iter_mut()
                .find(|g| same_answer(g.representative, answer))
            {
                Some(group) => group.members.push(result),
                None => groups.push(Group {
                    representative: answer,
                    members: vec![result],
                }),
            }
        }

        // Groups are formed in strategy order, so the first largest group is
        // the one holding the earliest strategy.
        let mut winner = 0;
        for (i, group) in groups.iter().enumerate() {
            if group.members.len() > groups[winner].members.len() {
                winner = i;
            }
        }
        let winning = &groups[winner];
        let tied = groups
            .iter()
            .enumerate()
            .any(|(i, g)| i != winner && g.members.len() == winning.members.len());

        let agreement = winning.members.len() as f64 / ok.len() as f64;
        let confidence = if agreement < 1.0 && ok.len() >= 2 {
            agreement * self.disagreement_penalty
        } else {
            agreement
        };
        let degraded = ok.len() < quorum;

        let kind = if degraded {
            VerdictKind::Degraded
        } else if groups.len() == 1 {
            VerdictKind::Unanimous
        } else if tied {
            VerdictKind::Split
        } else {
            VerdictKind::Majority
        };

        let concurring: Vec<StrategyId> =
            winning.members.iter().map(|r| r.strategy.clone()).collect();
        let dissent = ordered
            .iter()
            .filter(|r| !winning.members.iter().any(|m| std::ptr::eq(*m, **r)))
            .map(|r| (*r).clone())
            .collect();
        let votes = groups
            .iter()
            .map(|g| VoteTally {
                value: g.representative.value.clone(),
                strategies: g.members.iter().map(|r| r.strategy.clone()).collect(),
            })
            .collect();

        Verdict {
            answer: VerdictAnswer::Adjudicated(winning.representative.clone()),
            kind,
            confidence,
            agreement,
            concurring,
            ok_count: ok.len(),
            total,
            quorum,
            votes,
            dissent,
            degraded,
            synthesis: None,
        }
    }

    /// Verdict when no strategy produced an `Ok` result: pass the least
    /// malformed raw text through unadjudicated.
    fn no_answer_verdict(ordered: &[&StrategyResult], total: usize, quorum: usize) -> Verdict {
        // `ordered` is in strategy order and min_by_key keeps the first minimum
        let answer = ordered
            .iter()
            .filter(|r| r.raw_text.as_deref().is_some_and(|t| !t.trim().is_empty()))
            .min_by_key(|r| r.status.malformation_rank())
            .map(|r| VerdictAnswer::Unadjudicated {
                strategy: r.strategy.clone(),
                raw_text: r.raw_text.clone().unwrap_or_default(),
            })
            .unwrap_or(VerdictAnswer::Unavailable);

        Verdict {
            answer,
            kind: VerdictKind::Degraded,
            confidence: 0.0,
            agreement: 0.0,
            concurring: Vec::new(),
            ok_count: 0,
            total,
            quorum,
            votes: Vec::new(),
            dissent: ordered.iter().map(|r| (*r).clone()).collect(),
            degraded: true,
            synthesis: None,
        }
    }
}

/// Results sorted by position in the strategy set; strategies outside the
/// set go last, by identifier.
fn order_results<'a>(
    strategy_set: &[StrategyId],
    results: &'a [StrategyResult],
) -> Vec<&'a StrategyResult> {
    let mut ordered: Vec<&StrategyResult> = results.iter().collect();
    ordered.sort_by(|a, b| {
        let pos = |r: &StrategyResult| {
            strategy_set
                .iter()
                .position(|s| *s == r.strategy)
                .unwrap_or(usize::MAX)
        };
        pos(a)
            .cmp(&pos(b))
            .then_with(|| a.strategy.cmp(&b.strategy))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::failure::BackendFailure;
    use crate::quorum::result::StrategyStatus;

    fn three() -> Vec<StrategyId> {
        vec![
            StrategyId::Systematic,
            StrategyId::KeyDifference,
            StrategyId::Mechanistic,
        ]
    }

    fn ok(strategy: StrategyId, value: &str) -> StrategyResult {
        StrategyResult::ok(
            strategy,
            NormalizedAnswer::new(value),
            format!("ANSWER: {}", value),
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_two_against_one() {
        let results = vec![
            ok(StrategyId::Systematic, "X"),
            ok(StrategyId::KeyDifference, "X"),
            ok(StrategyId::Mechanistic, "Y"),
        ];
        let verdict = Arbiter::default().arbitrate(&three(), &results);

        assert_eq!(verdict.answer.value(), Some("X"));
        assert_close(verdict.agreement, 2.0 / 3.0);
        assert_close(verdict.confidence, 2.0 / 3.0 * 0.7);
        assert!(!verdict.degraded);
        assert_eq!(verdict.kind, VerdictKind::Majority);
        assert_eq!(verdict.quorum, 2);
        assert_eq!(verdict.agreement_count(), 2);
        assert_eq!(verdict.dissent.len(), 1);
        assert_eq!(verdict.dissent[0].strategy, StrategyId::Mechanistic);
        assert_eq!(verdict.vote_summary(), "[●●○]");
    }

    #[test]
    fn test_all_backend_errors() {
        let results: Vec<_> = three()
            .into_iter()
            .map(|s| StrategyResult::backend_error(s, Some(BackendFailure::timeout("slow"))))
            .collect();
        let verdict = Arbiter::default().arbitrate(&three(), &results);

        assert!(verdict.degraded);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.kind, VerdictKind::Degraded);
        assert_eq!(verdict.answer, VerdictAnswer::Unavailable);
        assert_eq!(verdict.dissent.len(), 3);
        assert!(
            verdict
                .dissent
                .iter()
                .all(|r| r.status == StrategyStatus::BackendError)
        );
    }

    #[test]
    fn test_unanimous() {
        let results = vec![
            ok(StrategyId::Mechanistic, "(b)"),
            ok(StrategyId::Systematic, "B"),
            ok(StrategyId::KeyDifference, "b"),
        ];
        let verdict = Arbiter::default().arbitrate(&three(), &results);

        assert_eq!(verdict.kind, VerdictKind::Unanimous);
        assert_close(verdict.confidence, 1.0);
        assert!(verdict.dissent.is_empty());
        assert_eq!(
            verdict.concurring,
            vec![
                StrategyId::Systematic,
                StrategyId::KeyDifference,
                StrategyId::Mechanistic
            ]
        );
        // Representative comes from the earliest strategy
        assert_eq!(verdict.answer.display_text(), "B");
    }

    #[test]
    fn test_tie_broken_by_strategy_order() {
        let strategies = StrategyId::default_set();
        // Completion order deliberately differs from strategy order
        let results = vec![
            ok(StrategyId::DevilsAdvocate, "A"),
            ok(StrategyId::KeyDifference, "C"),
            ok(StrategyId::Mechanistic, "A"),
            ok(StrategyId::Systematic, "C"),
        ];
        let verdict = Arbiter::default().arbitrate(&strategies, &results);

        assert_eq!(verdict.answer.value(), Some("C"));
        assert_eq!(verdict.kind, VerdictKind::Split);
        assert_close(verdict.agreement, 0.5);
        assert_close(verdict.confidence, 0.35);
    }

    #[test]
    fn test_arbitrate_is_deterministic() {
        let results = vec![
            ok(StrategyId::Mechanistic, "Y"),
            StrategyResult::parse_error(StrategyId::DevilsAdvocate, "hmm", "no answer"),
            ok(StrategyId::Systematic, "X"),
            ok(StrategyId::KeyDifference, "Y"),
        ];
        let arbiter = Arbiter::default();
        let first = arbiter.arbitrate(&StrategyId::default_set(), &results);
        let second = arbiter.arbitrate(&StrategyId::default_set(), &results);
        assert_eq!(first, second);

        let mut reversed = results.clone();
        reversed.reverse();
        let third = arbiter.arbitrate(&StrategyId::default_set(), &reversed);
        assert_eq!(first, third);
    }

    #[test]
    fn test_non_ok_results_never_count() {
        let results = vec![
            ok(StrategyId::Systematic, "A"),
            StrategyResult::parse_error(StrategyId::KeyDifference, "ANSWER? B-ish", "no answer"),
            StrategyResult::timeout(StrategyId::Mechanistic),
        ];
        let verdict = Arbiter::default().arbitrate(&three(), &results);

        assert_eq!(verdict.ok_count, 1);
        assert_close(verdict.agreement, 1.0);
        // Single Ok result: no penalty, but below the quorum of 2
        assert_close(verdict.confidence, 1.0);
        assert!(verdict.degraded);
        assert_eq!(verdict.kind, VerdictKind::Degraded);
        assert_eq!(verdict.dissent.len(), 2);
        assert_eq!(verdict.vote_summary(), "[●✕✕]");
    }

    #[test]
    fn test_no_ok_passes_parse_error_text_through() {
        let results = vec![
            StrategyResult::backend_error(StrategyId::Systematic, None),
            StrategyResult::parse_error(
                StrategyId::Mechanistic,
                "The SN1 path dominates, likely C",
                "no final answer",
            ),
            StrategyResult::timeout(StrategyId::KeyDifference),
        ];
        let verdict = Arbiter::default().arbitrate(&three(), &results);

        assert!(verdict.degraded);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(
            verdict.answer,
            VerdictAnswer::Unadjudicated {
                strategy: StrategyId::Mechanistic,
                raw_text: "The SN1 path dominates, likely C".to_string(),
            }
        );
        assert_eq!(verdict.dissent[0].strategy, StrategyId::Systematic);
    }

    #[test]
    fn test_quorum_met_is_not_degraded() {
        let strategies = StrategyId::default_set();
        let results = vec![
            ok(StrategyId::Systematic, "D"),
            ok(StrategyId::KeyDifference, "D"),
            StrategyResult::timeout(StrategyId::Mechanistic),
            StrategyResult::timeout(StrategyId::DevilsAdvocate),
        ];
        let verdict = Arbiter::default().arbitrate(&strategies, &results);

        assert_eq!(verdict.quorum, 2);
        assert!(!verdict.degraded);
        assert!(verdict.agreement >= verdict.quorum as f64 / verdict.ok_count as f64);
        assert_eq!(verdict.kind, VerdictKind::Unanimous);
    }

    #[test]
    fn test_custom_comparator() {
        let results = vec![
            ok(StrategyId::Systematic, "ethanol"),
            ok(StrategyId::KeyDifference, "Ethanol (C2H5OH)"),
            ok(StrategyId::Mechanistic, "methanol"),
        ];
        let verdict = Arbiter::default().arbitrate_with(&three(), &results, |a, b| {
            a.value.split_whitespace().next() == b.value.split_whitespace().next()
        });

        assert_eq!(verdict.answer.value(), Some("ethanol"));
        assert_eq!(verdict.agreement_count(), 2);
    }

    #[test]
    fn test_penalty_is_clamped() {
        let arbiter = Arbiter::new(QuorumRule::Majority, 3.0);
        assert_eq!(arbiter.disagreement_penalty(), 1.0);
    }
}
