//! Output formatter trait

use quorum_domain::{OutputFormat, Verdict};

/// Trait for formatting verdicts
pub trait OutputFormatter {
    /// Verdict, vote distribution and every strategy's outcome
    fn format_full(&self, verdict: &Verdict) -> String;

    /// Format as JSON
    fn format_json(&self, verdict: &Verdict) -> String;

    /// Answer and confidence only (concise output)
    fn format_answer(&self, verdict: &Verdict) -> String;

    fn render(&self, verdict: &Verdict, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format_full(verdict),
            OutputFormat::Answer => self.format_answer(verdict),
            OutputFormat::Json => self.format_json(verdict),
        }
    }
}
