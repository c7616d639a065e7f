//! Progress reporting while a request is resolved

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use quorum_application::ports::progress::ProgressNotifier;
use quorum_domain::{Request, StrategyId, StrategyResult, StrategyStatus, Verdict};
use std::sync::Mutex;

/// Reports progress with a bar over the strategy set
pub struct ProgressReporter {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.as_ref() {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line status mark for a finished strategy
fn status_mark(result: &StrategyResult) -> String {
    let name = result.strategy.display_name();
    match result.status {
        StrategyStatus::Ok => format!(
            "{} {} → {}",
            "v".green(),
            name,
            result.answer.as_ref().map(|a| a.value.as_str()).unwrap_or("?")
        ),
        StrategyStatus::Timeout => format!("{} {} (timeout)", "x".yellow(), name),
        status => format!("{} {} ({})", "x".red(), name, status.as_str()),
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_request_start(&self, request: &Request) {
        let bar = self
            .multi
            .add(ProgressBar::new(request.strategy_set().len() as u64));
        bar.set_style(Self::bar_style());
        bar.set_prefix("Strategies");
        bar.set_message("Starting...");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        *self.bar.lock().unwrap_or_else(|p| p.into_inner()) = Some(bar);
    }

    fn on_strategy_start(&self, strategy: &StrategyId) {
        self.with_bar(|bar| bar.set_message(format!("{} started", strategy.display_name())));
    }

    fn on_strategy_complete(&self, result: &StrategyResult) {
        self.with_bar(|bar| {
            bar.set_message(status_mark(result));
            bar.inc(1);
        });
    }

    fn on_synthesis_start(&self) {
        self.with_bar(|bar| bar.set_message("weighing disagreeing answers..."));
    }

    fn on_verdict(&self, verdict: &Verdict) {
        let bar = self.bar.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(bar) = bar {
            bar.finish_with_message(format!(
                "{} {}",
                "done".green(),
                verdict.vote_summary()
            ));
        }
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_request_start(&self, request: &Request) {
        eprintln!(
            "{} {} ({} strategies)",
            "->".cyan(),
            request.id().to_string().bold(),
            request.strategy_set().len()
        );
    }

    fn on_strategy_start(&self, _strategy: &StrategyId) {}

    fn on_strategy_complete(&self, result: &StrategyResult) {
        eprintln!("  {}", status_mark(result));
    }

    fn on_synthesis_start(&self) {
        eprintln!("  {} weighing disagreeing answers", "..".cyan());
    }

    fn on_verdict(&self, verdict: &Verdict) {
        eprintln!("  {} {}", verdict.kind, verdict.vote_summary());
    }
}
