//! Quorum rules
//!
//! A rule turns the size of a request's strategy set into the number of
//! `Ok` results needed for a non-degraded verdict.

use serde::{Deserialize, Serialize};

/// Rule for the minimum number of `Ok` results
///
/// - `Half`: at least half, rounded up (default)
/// - `Majority`: more than half
/// - `Unanimous`: every strategy
/// - `AtLeast(n)`: at least n
/// - `Percentage(p)`: at least p%
///
/// Every rule requires at least one `Ok` result.
///
/// # Example
///
/// ```
/// use quorum_domain::quorum::QuorumRule;
///
/// let rule = QuorumRule::Half;
/// assert_eq!(rule.required(3), 2);
/// assert_eq!(rule.required(4), 2);
/// assert_eq!(rule.required(1), 1);
///
/// assert!(rule.is_satisfied(2, 3));
/// assert!(!rule.is_satisfied(1, 3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuorumRule {
    /// ceil(n / 2)
    #[default]
    Half,

    /// n / 2 + 1
    Majority,

    /// All strategies
    Unanimous,

    /// At least n results
    AtLeast(usize),

    /// At least this percentage (0-100)
    Percentage(u8),
}

impl QuorumRule {
    /// Minimum `Ok` results required out of `total` strategies
    pub fn required(&self, total: usize) -> usize {
        let required = match self {
            QuorumRule::Half => total.div_ceil(2),
            QuorumRule::Majority => total / 2 + 1,
            QuorumRule::Unanimous => total,
            QuorumRule::AtLeast(n) => *n,
            QuorumRule::Percentage(p) => (total as f64 * (*p as f64 / 100.0)).ceil() as usize,
        };
        required.max(1)
    }

    /// Check whether `ok` results out of `total` strategies meet the rule
    pub fn is_satisfied(&self, ok: usize, total: usize) -> bool {
        if total == 0 {
            return false;
        }
        ok >= self.required(total)
    }

    /// Get a human-readable description of this rule
    pub fn description(&self) -> String {
        match self {
            QuorumRule::Half => "half (rounded up)".to_string(),
            QuorumRule::Majority => "majority (more than half)".to_string(),
            QuorumRule::Unanimous => "unanimous (every strategy)".to_string(),
            QuorumRule::AtLeast(n) => format!("at least {} results", n),
            QuorumRule::Percentage(p) => format!("at least {}% of strategies", p),
        }
    }
}

impl std::fmt::Display for QuorumRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for QuorumRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "half" => Ok(QuorumRule::Half),
            "majority" => Ok(QuorumRule::Majority),
            "unanimous" => Ok(QuorumRule::Unanimous),
            s if s.starts_with("atleast:") || s.starts_with("at_least:") => {
                let n: usize = s
                    .split(':')
                    .nth(1)
                    .ok_or("Missing number after atleast:")?
                    .parse()
                    .map_err(|_| "Invalid number for atleast")?;
                Ok(QuorumRule::AtLeast(n))
            }
            s if s.starts_with("percentage:") || s.ends_with('%') => {
                let num_str = s.trim_start_matches("percentage:").trim_end_matches('%');
                let p: u8 = num_str.parse().map_err(|_| "Invalid percentage")?;
                if p > 100 {
                    return Err(format!("Percentage out of range: {}", p));
                }
                Ok(QuorumRule::Percentage(p))
            }
            _ => Err(format!(
                "Unknown quorum rule: {}. Valid: half, majority, unanimous, atleast:N, percentage:N or N%",
                s
            )),
        }
    }
}
