//! Progress notification port
//!
//! Defines the interface for reporting progress while a request is resolved.

use quorum_domain::{Request, StrategyId, StrategyResult, Verdict};

/// Callback for progress updates during resolution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain logs, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any strategy is launched
    fn on_request_start(&self, _request: &Request) {}

    /// Called when a strategy runner is launched
    fn on_strategy_start(&self, strategy: &StrategyId);

    /// Called when a strategy result is available, including synthesized
    /// timeouts for runners cut off by the deadline
    fn on_strategy_complete(&self, result: &StrategyResult);

    /// Called before the advisory synthesis round over disagreeing answers
    fn on_synthesis_start(&self) {}

    /// Called once the verdict is final
    fn on_verdict(&self, _verdict: &Verdict) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_strategy_start(&self, _strategy: &StrategyId) {}
    fn on_strategy_complete(&self, _result: &StrategyResult) {}
}
