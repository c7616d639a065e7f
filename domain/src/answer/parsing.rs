//! Backend output parsing.
//!
//! Extracts a [`NormalizedAnswer`] from free-form backend text. Pure domain
//! logic: no I/O, just pattern matching.
//!
//! # Supported Formats
//!
//! 1. **JSON** (preferred): `{"answer": "B", "steps": ["..."], "confidence": 85}`
//! 2. **Labeled lines**: `FINAL ANSWER: (B)`, `MY ANSWER: C`, `Answer - 2.5`
//! 3. **Inline letter**: `... so the answer is (D)`
//!
//! Output with none of these is a [`ParseError`]: the backend answered but
//! broke the output contract.

use super::entities::NormalizedAnswer;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum number of step lines kept in the trail
const MAX_STEPS: usize = 20;

/// Errors from normalizing backend output
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("backend returned empty output")]
    EmptyOutput,

    #[error("no final answer found in backend output")]
    MissingAnswer,
}

static LABELED_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[\s>#*-]*(?:final\s+answer|my\s+answer|answer|option)\s*\**\s*[:=\-]\s*\**\s*(?P<value>[^\n]*?)\s*\**\s*$",
    )
    .expect("labeled answer regex is valid")
});

static INLINE_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\banswer\s+(?:is\s+)?(?:option\s+)?\(([a-d])\)")
        .expect("inline answer regex is valid")
});

/// An option letter closed by `)`, `]`, `.` or `:`, e.g. `B) because...`.
/// A letter followed by a space is a word, not an option.
static LEADING_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[(\[]?([A-Da-d])[)\].:]").expect("leading letter regex is valid")
});

static CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence\s*\**\s*[:=]?\s*\**\s*(\d{1,3})\s*%?")
        .expect("confidence regex is valid")
});

static STEP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*step\s*\d+\s*[:.)\-]\s*(.+?)\s*$").expect("step regex is valid")
});

/// Parse raw backend output into a normalized answer.
///
/// # Examples
///
/// ```
/// use quorum_domain::answer::parse_answer;
///
/// let answer = parse_answer("Step 1: compare carbocations\nANSWER: (C)\nCONFIDENCE: 85%").unwrap();
/// assert_eq!(answer.value, "C");
/// assert_eq!(answer.confidence, Some(85));
/// assert_eq!(answer.steps, vec!["compare carbocations".to_string()]);
///
/// assert!(parse_answer("I am not sure.").is_err());
/// ```
pub fn parse_answer(raw: &str) -> Result<NormalizedAnswer, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyOutput);
    }

    if let Some(answer) = parse_json_answer(raw) {
        return Ok(answer);
    }

    let value = labeled_value(raw)
        .or_else(|| {
            INLINE_LETTER
                .captures_iter(raw)
                .last()
                .map(|c| c[1].to_uppercase())
        })
        .ok_or(ParseError::MissingAnswer)?;

    let mut answer = normalized_value(value).with_steps(step_trail(raw));
    if let Some(confidence) = parse_confidence(raw) {
        answer = answer.with_confidence(confidence);
    }
    Ok(answer)
}

/// Try the JSON output contract
fn parse_json_answer(raw: &str) -> Option<NormalizedAnswer> {
    let start = raw.find('{')?;
    let end = raw[start..].rfind('}')?;
    let parsed: serde_json::Value = serde_json::from_str(&raw[start..start + end + 1]).ok()?;

    let value = match parsed.get("answer")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let steps = parsed
        .get("steps")
        .and_then(|v| v.as_array())
        .map(|steps| {
            steps
                .iter()
                .filter_map(|s| s.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(MAX_STEPS)
                .collect()
        })
        .unwrap_or_default();

    let mut answer = normalized_value(value).with_steps(steps);
    if let Some(confidence) = parsed.get("confidence").and_then(|v| v.as_f64()) {
        answer = answer.with_confidence(confidence.clamp(0.0, 100.0) as u8);
    }
    Some(answer)
}

/// Value of the last labeled answer line
fn labeled_value(raw: &str) -> Option<String> {
    LABELED_ANSWER
        .captures_iter(raw)
        .filter_map(|c| c.name("value").map(|m| m.as_str().trim().to_string()))
        .filter(|v| !v.is_empty())
        .last()
}

/// Answer for a written final value. The canonical value is reduced to the
/// option letter when the value opens with a closed one; the display keeps
/// what the backend wrote.
fn normalized_value(value: String) -> NormalizedAnswer {
    let letter = LEADING_LETTER.captures(&value).map(|c| c[1].to_uppercase());
    let mut answer = NormalizedAnswer::new(value);
    if let Some(letter) = letter {
        answer.value = letter;
    }
    answer
}

fn parse_confidence(raw: &str) -> Option<u8> {
    CONFIDENCE
        .captures_iter(raw)
        .last()
        .and_then(|c| c[1].parse::<u16>().ok())
        .map(|n| n.min(100) as u8)
}

/// Explicit `Step N:` lines, or failing that every line that is not the
/// answer or confidence line
fn step_trail(raw: &str) -> Vec<String> {
    let explicit: Vec<String> = raw
        .lines()
        .filter_map(|line| STEP_LINE.captures(line).map(|c| c[1].to_string()))
        .take(MAX_STEPS)
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !LABELED_ANSWER.is_match(line) && !CONFIDENCE.is_match(line))
        .map(str::to_string)
        .take(MAX_STEPS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_contract() {
        let raw = r#"Here you go:
```json
{"answer": "(b)", "steps": ["Identify NGP", "Compare rates"], "confidence": 92}
```"#;
        let answer = parse_answer(raw).unwrap();
        assert_eq!(answer.value, "B");
        assert_eq!(answer.display, "(b)");
        assert_eq!(answer.steps.len(), 2);
        assert_eq!(answer.confidence, Some(92));
    }

    #[test]
    fn test_parse_json_numeric_answer() {
        let answer = parse_answer(r#"{"answer": 2.50}"#).unwrap();
        assert_eq!(answer.value, "2.5");
    }

    #[test]
    fn test_parse_systematic_format() {
        let raw = "Step 1: List the substrates\nStep 2: Compare carbocation stability\nEliminated: A, D\nANSWER: (C)\nCONFIDENCE: 85%";
        let answer = parse_answer(raw).unwrap();
        assert_eq!(answer.value, "C");
        assert_eq!(answer.confidence, Some(85));
        assert_eq!(
            answer.steps,
            vec![
                "List the substrates".to_string(),
                "Compare carbocation stability".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_devils_advocate_format() {
        let raw = "POTENTIAL ERRORS IN REASONING: distance rule ignored\nMY ANSWER: (a)\nCONFIDENCE: 70%";
        let answer = parse_answer(raw).unwrap();
        assert_eq!(answer.value, "A");
        assert_eq!(
            answer.steps,
            vec!["POTENTIAL ERRORS IN REASONING: distance rule ignored".to_string()]
        );
    }

    #[test]
    fn test_last_labeled_answer_wins() {
        let raw = "Answer: A seemed plausible at first\nFINAL ANSWER: (D)";
        assert_eq!(parse_answer(raw).unwrap().value, "D");
    }

    #[test]
    fn test_parse_numeric_labeled_answer() {
        let raw = "The pH works out as follows.\nFinal Answer: 4.70";
        assert_eq!(parse_answer(raw).unwrap().value, "4.7");
    }

    #[test]
    fn test_parse_inline_letter() {
        let raw = "Both paths considered, the answer is (b) because of NGP.";
        assert_eq!(parse_answer(raw).unwrap().value, "B");
    }

    #[test]
    fn test_missing_answer_is_error() {
        assert_eq!(
            parse_answer("The mechanism is unclear from the image."),
            Err(ParseError::MissingAnswer)
        );
    }

    #[test]
    fn test_empty_output_is_error() {
        assert_eq!(parse_answer("  \n "), Err(ParseError::EmptyOutput));
    }

    #[test]
    fn test_confidence_clamped() {
        let answer = parse_answer("ANSWER: B\nConfidence: 250%").unwrap();
        assert_eq!(answer.confidence, Some(100));
    }

    #[test]
    fn test_closed_option_letter_reduced() {
        for raw in ["ANSWER: (B)", "ANSWER: B)", "ANSWER: B.", "ANSWER: B:", "ANSWER: b"] {
            assert_eq!(parse_answer(raw).unwrap().value, "B", "{raw}");
        }
        let answer = parse_answer("FINAL ANSWER: (D) because the leaving group is axial").unwrap();
        assert_eq!(answer.value, "D");
        assert_eq!(answer.display, "(D) because the leaving group is axial");
    }

    #[test]
    fn test_leading_word_is_not_an_option_letter() {
        let option_a = parse_answer("ANSWER: (A)").unwrap();

        let racemic = parse_answer("Reasoning about the carbocation...\nANSWER: a racemic mixture").unwrap();
        assert_eq!(racemic.value, "a racemic mixture");
        assert!(!racemic.agrees_with(&option_a));

        let both = parse_answer("ANSWER: A and C").unwrap();
        assert_eq!(both.value, "a and c");
        assert!(!both.agrees_with(&option_a));
    }

    #[test]
    fn test_json_and_text_normalize_alike() {
        let json = parse_answer(r#"{"answer": "B) because the anion is resonance stabilized"}"#).unwrap();
        let text = parse_answer("ANSWER: B) because the anion is resonance stabilized").unwrap();
        assert_eq!(json.value, "B");
        assert_eq!(json.value, text.value);

        let json_word = parse_answer(r#"{"answer": "a racemic mixture"}"#).unwrap();
        assert_eq!(json_word.value, "a racemic mixture");
    }

    #[test]
    fn test_json_without_answer_falls_back_to_text() {
        let raw = "{\"note\": \"draft\"}\nANSWER: (A)";
        assert_eq!(parse_answer(raw).unwrap().value, "A");
    }
}
