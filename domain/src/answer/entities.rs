//! Normalized answer value object

use serde::{Deserialize, Serialize};

/// A structured answer extracted from one strategy's output
///
/// # Example
///
/// ```
/// use quorum_domain::NormalizedAnswer;
///
/// let a = NormalizedAnswer::new("(b)");
/// let b = NormalizedAnswer::new("B").with_steps(vec!["NGP at C-2".to_string()]);
/// assert_eq!(a.value, "B");
/// assert!(a.agrees_with(&b));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAnswer {
    /// Canonical final value; the only field compared during arbitration
    pub value: String,
    /// Final value as the backend wrote it
    pub display: String,
    /// Step trail, in order
    pub steps: Vec<String>,
    /// Self-reported confidence (0-100), informational only
    pub confidence: Option<u8>,
}

impl NormalizedAnswer {
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into().trim().to_string();
        Self {
            value: canonicalize(&display),
            display,
            steps: Vec::new(),
            confidence: None,
        }
    }

    pub fn with_steps(mut self, steps: Vec<String>) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence.min(100));
        self
    }

    /// Structural equality: canonical values match
    pub fn agrees_with(&self, other: &NormalizedAnswer) -> bool {
        self.value == other.value
    }
}

/// Canonical form of a final value.
///
/// - Option letters lose their wrapping: `(b)`, `[B]`, `b.` → `B`
/// - Numbers lose formatting noise: `2.50` → `2.5`, `+3` → `3`
/// - Anything else is lowercased with whitespace collapsed
pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw
        .trim()
        .trim_end_matches(['.', ',', ';'])
        .trim_matches(|c: char| matches!(c, '(' | ')' | '[' | ']' | '"' | '\'' | '*' | '`'))
        .trim();

    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_ascii_alphabetic()
    {
        return c.to_ascii_uppercase().to_string();
    }

    if let Ok(number) = trimmed.replace(',', "").parse::<f64>()
        && number.is_finite()
    {
        // -0 and 0 are the same answer
        let number = if number == 0.0 { 0.0 } else { number };
        return format!("{}", number);
    }

    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
