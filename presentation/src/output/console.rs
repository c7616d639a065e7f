//! Console output formatter for verdicts

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use quorum_domain::{StrategyResult, StrategyStatus, Verdict, VerdictAnswer, VerdictKind};

/// Formats verdicts for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete verdict
    pub fn format(verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consensus Verdict"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Answer:".cyan().bold(),
            Self::answer_text(verdict)
        ));
        output.push_str(&format!(
            "{} {} {}\n",
            "Confidence:".cyan().bold(),
            Self::confidence_text(verdict),
            verdict.vote_summary()
        ));
        output.push_str(&format!(
            "{} {} ({} of {} strategies answered, quorum {})\n",
            "Verdict:".cyan().bold(),
            Self::kind_label(verdict.kind),
            verdict.ok_count,
            verdict.total,
            verdict.quorum
        ));

        if let VerdictAnswer::Adjudicated(answer) = &verdict.answer
            && !answer.steps.is_empty()
        {
            output.push_str(&Self::section_header("Reasoning"));
            for (i, step) in answer.steps.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, step));
            }
        }

        if !verdict.votes.is_empty() {
            output.push_str(&Self::section_header("Votes"));
            for tally in &verdict.votes {
                let strategies: Vec<&str> =
                    tally.strategies.iter().map(|s| s.display_name()).collect();
                output.push_str(&format!(
                    "  {:<12} {} ({})\n",
                    tally.value.bold(),
                    tally.count(),
                    strategies.join(", ")
                ));
            }
        }

        if !verdict.concurring.is_empty() {
            let names: Vec<&str> = verdict.concurring.iter().map(|s| s.display_name()).collect();
            output.push_str(&format!(
                "\n{} {}\n",
                "Concurring:".green().bold(),
                names.join(", ")
            ));
        }

        if !verdict.dissent.is_empty() {
            output.push_str(&Self::section_header("Dissent"));
            for result in &verdict.dissent {
                output.push_str(&Self::dissent_line(result));
            }
        }

        if let Some(synthesis) = &verdict.synthesis {
            output.push_str(&Self::section_header("Synthesis (advisory)"));
            output.push_str(&Self::synthesis_line(verdict, synthesis));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(verdict: &Verdict) -> String {
        serde_json::to_string_pretty(verdict).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format answer only (concise output)
    pub fn format_answer_only(verdict: &Verdict) -> String {
        let mut output = format!(
            "{} {}  {} {}\n",
            "Answer:".bold(),
            Self::answer_text(verdict),
            Self::confidence_text(verdict),
            verdict.vote_summary().dimmed()
        );
        if verdict.is_degraded() {
            output.push_str(&format!(
                "{}\n",
                format!(
                    "Degraded: only {} of {} strategies answered",
                    verdict.ok_count, verdict.total
                )
                .yellow()
            ));
        }
        output
    }

    fn answer_text(verdict: &Verdict) -> String {
        match &verdict.answer {
            VerdictAnswer::Adjudicated(answer) => answer.value.green().bold().to_string(),
            VerdictAnswer::Unadjudicated { strategy, raw_text } => format!(
                "{} {}",
                format!("(unadjudicated, from {})", strategy.display_name()).yellow(),
                raw_text.trim()
            ),
            VerdictAnswer::Unavailable => "no answer".red().bold().to_string(),
        }
    }

    fn confidence_text(verdict: &Verdict) -> String {
        let percent = format!("{:.0}%", verdict.confidence * 100.0);
        if verdict.confidence >= 0.75 {
            percent.green().to_string()
        } else if verdict.confidence >= 0.5 {
            percent.yellow().to_string()
        } else {
            percent.red().to_string()
        }
    }

    fn kind_label(kind: VerdictKind) -> String {
        match kind {
            VerdictKind::Unanimous => kind.as_str().green().to_string(),
            VerdictKind::Majority => kind.as_str().cyan().to_string(),
            VerdictKind::Split => kind.as_str().yellow().to_string(),
            VerdictKind::Degraded => kind.as_str().red().to_string(),
        }
    }

    fn dissent_line(result: &StrategyResult) -> String {
        let name = result.strategy.display_name();
        match result.status {
            StrategyStatus::Ok => format!(
                "  {} {}: {}\n",
                "○".yellow(),
                name,
                result.answer.as_ref().map(|a| a.value.as_str()).unwrap_or("?")
            ),
            status => format!(
                "  {} {}: {} ({})\n",
                "✕".red(),
                name,
                status.as_str(),
                result.failure_summary().unwrap_or_default()
            ),
        }
    }

    fn synthesis_line(verdict: &Verdict, synthesis: &StrategyResult) -> String {
        match (&synthesis.answer, verdict.synthesis_concurs()) {
            (Some(answer), Some(concurs)) => {
                let note = if concurs {
                    "agrees with the verdict".green()
                } else {
                    "differs from the verdict".yellow()
                };
                let confidence = answer
                    .confidence
                    .map(|c| format!(" at {}%", c))
                    .unwrap_or_default();
                format!("  {}{} ({})\n", answer.value.bold(), confidence, note)
            }
            _ => format!(
                "  {} {} ({})\n",
                "✕".red(),
                synthesis.status.as_str(),
                synthesis.failure_summary().unwrap_or_default()
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_full(&self, verdict: &Verdict) -> String {
        Self::format(verdict)
    }

    fn format_json(&self, verdict: &Verdict) -> String {
        Self::format_json(verdict)
    }

    fn format_answer(&self, verdict: &Verdict) -> String {
        Self::format_answer_only(verdict)
    }
}
