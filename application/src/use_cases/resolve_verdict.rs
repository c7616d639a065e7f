//! Resolve Verdict use case
//!
//! The debate coordinator: fans a request out to one strategy runner per
//! configured strategy, collects results under the request deadline, and
//! hands whatever is available to the arbiter.
//!
//! ```text
//! Request ─┬─► runner(strategy 1) ─┐
//!          ├─► runner(strategy 2) ─┼─► collect until done | deadline | cancel
//!          └─► runner(strategy N) ─┘            │
//!                                               ▼
//!                      missing strategies ──► Timeout results
//!                                               │
//!                                               ▼
//!                                  Arbiter ──► Verdict
//!                                               │
//!                           answers disagree ──►│ synthesis round (advisory,
//!                                               │ within the deadline)
//!                                               ▼
//!                                       Verdict + records
//! ```
//!
//! Resolution never fails: partial failure shows up in the verdict's
//! `degraded` flag and confidence.

use crate::config::EngineConfig;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::reasoning_backend::ReasoningBackend;
use crate::ports::record_sink::{NoRecordSink, RecordSink};
use crate::use_cases::run_strategy::RunStrategyUseCase;
use quorum_domain::{
    Arbiter, BackendFailure, PromptTemplate, Request, StrategyId, StrategyRecord, StrategyResult,
    Verdict, VerdictRecord,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why collection stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cutoff {
    /// Every runner finished
    Complete,
    Deadline,
    Cancelled,
}

/// Use case for resolving a request into a verdict
pub struct ResolveVerdictUseCase<B: ReasoningBackend + ?Sized + 'static> {
    runner: RunStrategyUseCase<B>,
    arbiter: Arbiter,
    config: EngineConfig,
    records: Arc<dyn RecordSink>,
}

impl<B: ReasoningBackend + ?Sized + 'static> ResolveVerdictUseCase<B> {
    pub fn new(runner: RunStrategyUseCase<B>, config: EngineConfig) -> Self {
        let arbiter = Arbiter::new(config.quorum_rule, config.disagreement_penalty);
        let runner = runner.with_max_attempts(config.runner_attempts);
        Self {
            runner,
            arbiter,
            config,
            records: Arc::new(NoRecordSink),
        }
    }

    /// Send strategy and verdict records to `records`
    pub fn with_record_sink(mut self, records: Arc<dyn RecordSink>) -> Self {
        self.records = records;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn runner(&self) -> &RunStrategyUseCase<B> {
        &self.runner
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: Request) -> Verdict {
        self.execute_with_progress(request, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Execute the use case with progress callbacks and caller cancellation.
    ///
    /// Returns no later than the request deadline (plus one scheduling tick),
    /// or as soon as `cancel` fires, with the best verdict obtainable from the
    /// results completed by then.
    pub async fn execute_with_progress(
        &self,
        request: Request,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Verdict {
        let started = Instant::now();
        let deadline = started + request.deadline();
        let request = if self.config.fast {
            debug!("Fast mode: resolving with the first strategy only");
            request.into_fast()
        } else {
            request
        };
        let request = Arc::new(request);

        info!(
            "Resolving {} with {} strategies (deadline {}s)",
            request.id(),
            request.strategy_set().len(),
            request.deadline().as_secs_f64()
        );
        progress.on_request_start(&request);

        // Child token: cancelling it stops this request's runners without
        // touching the caller's token.
        let runners_cancel = cancel.child_token();
        let semaphore = Arc::new(Semaphore::new(self.config.effective_concurrency()));
        let mut join_set = JoinSet::new();

        for strategy in request.strategy_set() {
            progress.on_strategy_start(strategy);

            let runner = self.runner.clone();
            let request = Arc::clone(&request);
            let strategy = strategy.clone();
            let semaphore = Arc::clone(&semaphore);
            let cancel = runners_cancel.clone();

            join_set.spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => StrategyResult::timeout(strategy.clone()),
                    result = async {
                        let _permit = semaphore.acquire_owned().await.ok();
                        runner.execute(&request, &strategy, deadline, &cancel).await
                    } => result,
                    _ = tokio::time::sleep_until(deadline) => StrategyResult::timeout(strategy.clone()),
                }
            });
        }

        let mut results: Vec<StrategyResult> = Vec::with_capacity(request.strategy_set().len());
        let cutoff = loop {
            tokio::select! {
                biased;
                joined = join_set.join_next() => match joined {
                    Some(Ok(result)) => {
                        debug!("Strategy {} finished: {}", result.strategy, result.status);
                        progress.on_strategy_complete(&result);
                        results.push(result);
                    }
                    Some(Err(e)) => warn!("Strategy task failed: {}", e),
                    None => break Cutoff::Complete,
                },
                _ = tokio::time::sleep_until(deadline) => break Cutoff::Deadline,
                _ = cancel.cancelled() => break Cutoff::Cancelled,
            }
        };

        if cutoff != Cutoff::Complete {
            info!(
                "{} cut off ({:?}) with {}/{} results",
                request.id(),
                cutoff,
                results.len(),
                request.strategy_set().len()
            );
            runners_cancel.cancel();
            join_set.abort_all();
            // Aborted runners drop their leases here; results that landed in
            // the same tick are still usable.
            while let Some(joined) = join_set.join_next().await {
                if let Ok(result) = joined {
                    progress.on_strategy_complete(&result);
                    results.push(result);
                }
            }
        }

        for strategy in request.strategy_set() {
            if results.iter().any(|r| &r.strategy == strategy) {
                continue;
            }
            let missing = match cutoff {
                Cutoff::Complete => StrategyResult::backend_error(
                    strategy.clone(),
                    Some(BackendFailure::unknown("strategy runner stopped unexpectedly")),
                ),
                Cutoff::Deadline | Cutoff::Cancelled => StrategyResult::timeout(strategy.clone())
                    .with_latency(started.elapsed()),
            };
            progress.on_strategy_complete(&missing);
            results.push(missing);
        }

        let mut verdict = self.arbiter.arbitrate(request.strategy_set(), &results);
        let synthesis = match cutoff {
            Cutoff::Complete => {
                self.synthesize(&request, &results, &verdict, deadline, cancel, progress)
                    .await
            }
            Cutoff::Deadline | Cutoff::Cancelled => None,
        };
        if let Some(synthesis) = synthesis {
            verdict = verdict.with_synthesis(synthesis);
        }
        let elapsed = started.elapsed();

        self.emit_records(&request, &results, &verdict, elapsed.as_millis() as u64);

        info!(
            "{} resolved: {} {} (confidence {:.2}, {}/{} ok{})",
            request.id(),
            verdict.kind,
            verdict.answer.value().unwrap_or("-"),
            verdict.confidence,
            verdict.ok_count,
            verdict.total,
            if verdict.degraded { ", degraded" } else { "" }
        );
        progress.on_verdict(&verdict);

        verdict
    }

    /// Advisory arbitrator round over disagreeing `Ok` answers.
    ///
    /// Runs only when the answers disagree and time is left before the
    /// deadline. Its outcome never changes the verdict's answer or confidence.
    async fn synthesize(
        &self,
        request: &Request,
        results: &[StrategyResult],
        verdict: &Verdict,
        deadline: Instant,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Option<StrategyResult> {
        if !self.config.synthesis || !verdict.is_contested() {
            return None;
        }
        if cancel.is_cancelled() || Instant::now() >= deadline {
            debug!("{}: no time left for synthesis", request.id());
            return None;
        }

        info!(
            "{}: {} answer groups among {} ok results, running synthesis",
            request.id(),
            verdict.votes.len(),
            verdict.ok_count
        );
        progress.on_synthesis_start();

        let ordered: Vec<StrategyResult> = request
            .strategy_set()
            .iter()
            .filter_map(|s| results.iter().find(|r| &r.strategy == s).cloned())
            .collect();
        let prompt = PromptTemplate::synthesis(request.problem(), &ordered);
        let result = self
            .runner
            .execute_prompt(&StrategyId::Synthesis, &prompt, deadline, cancel)
            .await;

        match &result.answer {
            Some(answer) => info!(
                "{}: synthesis answered {} (arbitrated {})",
                request.id(),
                answer.value,
                verdict.answer.value().unwrap_or("-")
            ),
            None => warn!(
                "{}: synthesis failed ({}), arbitrated verdict stands",
                request.id(),
                result.status
            ),
        }
        Some(result)
    }

    fn emit_records(
        &self,
        request: &Request,
        results: &[StrategyResult],
        verdict: &Verdict,
        elapsed_ms: u64,
    ) {
        for strategy in request.strategy_set() {
            if let Some(result) = results.iter().find(|r| &r.strategy == strategy) {
                self.records
                    .emit(StrategyRecord::from_result(request.id(), result).into());
            }
        }
        if let Some(synthesis) = &verdict.synthesis {
            self.records
                .emit(StrategyRecord::from_result(request.id(), synthesis).into());
        }
        self.records
            .emit(VerdictRecord::from_verdict(request.id(), verdict, elapsed_ms).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PoolPolicy, RetryPolicy};
    use crate::services::credential_pool::CredentialPool;
    use async_trait::async_trait;
    use quorum_domain::{
        Credential, Problem, Prompt, PromptTemplate, Record, StrategyId, StrategyStatus,
        VerdictAnswer, VerdictKind,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend whose reply depends on the strategy persona in the prompt
    struct PersonaBackend {
        replies: HashMap<StrategyId, (Duration, Result<String, BackendFailure>)>,
        calls: Mutex<usize>,
    }

    impl PersonaBackend {
        fn new(replies: Vec<(StrategyId, Duration, Result<String, BackendFailure>)>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|(strategy, delay, reply)| (strategy, (delay, reply)))
                    .collect(),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ReasoningBackend for PersonaBackend {
        async fn call(
            &self,
            _token: &str,
            prompt: &Prompt,
            _timeout: Duration,
        ) -> Result<String, BackendFailure> {
            *self.calls.lock().unwrap() += 1;
            let (delay, reply) = self
                .replies
                .iter()
                .find(|(strategy, _)| {
                    prompt.system == PromptTemplate::persona(strategy)
                })
                .map(|(_, reply)| reply.clone())
                .unwrap_or((Duration::ZERO, Err(BackendFailure::unknown("no script"))));
            tokio::time::sleep(delay).await;
            reply
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        records: Mutex<Vec<Record>>,
    }

    impl RecordSink for CollectingSink {
        fn emit(&self, record: Record) {
            self.records.lock().unwrap().push(record);
        }
    }

    fn pool(n: usize) -> Arc<CredentialPool> {
        Arc::new(CredentialPool::new(
            (1..=n)
                .map(|i| Credential::new(format!("k{}", i), format!("t{}", i)))
                .collect(),
            PoolPolicy::default(),
        ))
    }

    fn coordinator(
        pool: Arc<CredentialPool>,
        backend: Arc<PersonaBackend>,
        config: EngineConfig,
    ) -> ResolveVerdictUseCase<PersonaBackend> {
        let runner = RunStrategyUseCase::new(pool, backend, config.retry);
        ResolveVerdictUseCase::new(runner, config)
    }

    fn three() -> Vec<StrategyId> {
        vec![
            StrategyId::Systematic,
            StrategyId::KeyDifference,
            StrategyId::Mechanistic,
        ]
    }

    fn request(strategies: Vec<StrategyId>, deadline: Duration) -> Request {
        Request::new(
            Problem::try_new("Which alkene is most stable?").unwrap(),
            strategies,
            deadline,
        )
        .unwrap()
    }

    fn reply(text: &str) -> Result<String, BackendFailure> {
        Ok(text.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn test_majority_verdict() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::from_millis(300), reply("ANSWER: X")),
            (StrategyId::KeyDifference, Duration::from_millis(100), reply("ANSWER: X")),
            (StrategyId::Mechanistic, Duration::from_millis(200), reply("ANSWER: Y")),
            (
                StrategyId::Synthesis,
                Duration::from_millis(500),
                reply("DECIDING FACTOR: ring strain\nFINAL ANSWER: (Y)\nFINAL CONFIDENCE: 60%"),
            ),
        ]));
        let sink = Arc::new(CollectingSink::default());
        let coordinator = coordinator(pool(3), backend, EngineConfig::default())
            .with_record_sink(sink.clone());

        let verdict = coordinator
            .execute(request(three(), Duration::from_secs(60)))
            .await;

        assert_eq!(verdict.answer.value(), Some("X"));
        assert_eq!(verdict.kind, VerdictKind::Majority);
        assert!((verdict.confidence - 2.0 / 3.0 * 0.7).abs() < 1e-9);
        assert!(!verdict.degraded);
        assert_eq!(verdict.dissent.len(), 1);

        // Synthesis is advisory: it disagrees, the majority answer stands
        let synthesis = verdict.synthesis.as_ref().unwrap();
        assert_eq!(synthesis.status, StrategyStatus::Ok);
        assert_eq!(synthesis.answer.as_ref().unwrap().value, "Y");
        assert_eq!(synthesis.answer.as_ref().unwrap().confidence, Some(60));
        assert!(synthesis.credential.is_some());
        assert_eq!(verdict.synthesis_concurs(), Some(false));

        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 5);
        match &records[0] {
            Record::Strategy(r) => assert_eq!(r.strategy, StrategyId::Systematic),
            Record::Verdict(_) => panic!("expected strategy record first"),
        }
        match &records[3] {
            Record::Strategy(r) => assert_eq!(r.strategy, StrategyId::Synthesis),
            Record::Verdict(_) => panic!("expected synthesis record before the verdict"),
        }
        match &records[4] {
            Record::Verdict(v) => assert_eq!(v.synthesis.as_deref(), Some("Y")),
            Record::Strategy(_) => panic!("expected verdict record last"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_synthesis_keeps_verdict() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::ZERO, reply("ANSWER: A")),
            (StrategyId::KeyDifference, Duration::ZERO, reply("ANSWER: B")),
            (StrategyId::Mechanistic, Duration::ZERO, reply("ANSWER: A")),
            (StrategyId::Synthesis, Duration::ZERO, Err(BackendFailure::auth("403"))),
        ]));
        let verdict = coordinator(pool(3), backend.clone(), EngineConfig::default())
            .execute(request(three(), Duration::from_secs(60)))
            .await;

        assert_eq!(backend.calls(), 4);
        assert_eq!(verdict.answer.value(), Some("A"));
        assert_eq!(verdict.kind, VerdictKind::Majority);
        assert!((verdict.confidence - 2.0 / 3.0 * 0.7).abs() < 1e-9);
        let synthesis = verdict.synthesis.as_ref().unwrap();
        assert_eq!(synthesis.status, StrategyStatus::BackendError);
        assert_eq!(verdict.synthesis_concurs(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_respects_deadline() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::from_secs(1), reply("ANSWER: A")),
            (StrategyId::KeyDifference, Duration::from_secs(1), reply("ANSWER: B")),
            (StrategyId::Synthesis, Duration::from_secs(3600), reply("FINAL ANSWER: B")),
        ]));
        let pool = pool(2);
        let started = Instant::now();
        let verdict = coordinator(pool.clone(), backend, EngineConfig::default())
            .execute(request(
                vec![StrategyId::Systematic, StrategyId::KeyDifference],
                Duration::from_secs(10),
            ))
            .await;

        assert!(started.elapsed() <= Duration::from_secs(10));
        assert_eq!(verdict.kind, VerdictKind::Split);
        assert_eq!(verdict.answer.value(), Some("A"));
        let synthesis = verdict.synthesis.as_ref().unwrap();
        assert_ne!(synthesis.status, StrategyStatus::Ok);
        assert!(pool.snapshot().iter().all(|s| !s.in_use));
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthesis_skipped_when_disabled_or_unanimous() {
        let disagreeing = || {
            Arc::new(PersonaBackend::new(vec![
                (StrategyId::Systematic, Duration::ZERO, reply("ANSWER: A")),
                (StrategyId::KeyDifference, Duration::ZERO, reply("ANSWER: B")),
                (StrategyId::Synthesis, Duration::ZERO, reply("FINAL ANSWER: A")),
            ]))
        };
        let pair = || vec![StrategyId::Systematic, StrategyId::KeyDifference];

        let backend = disagreeing();
        let config = EngineConfig::default().with_synthesis(false);
        let verdict = coordinator(pool(2), backend.clone(), config)
            .execute(request(pair(), Duration::from_secs(60)))
            .await;
        assert!(verdict.synthesis.is_none());
        assert_eq!(backend.calls(), 2);

        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::ZERO, reply("ANSWER: C")),
            (StrategyId::KeyDifference, Duration::ZERO, reply("ANSWER: (c)")),
        ]));
        let verdict = coordinator(pool(2), backend.clone(), EngineConfig::default())
            .execute(request(pair(), Duration::from_secs(60)))
            .await;
        assert_eq!(verdict.kind, VerdictKind::Unanimous);
        assert!(verdict.synthesis.is_none());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failures_give_degraded_verdict() {
        let backend = Arc::new(PersonaBackend::new(
            three()
                .into_iter()
                .map(|s| (s, Duration::ZERO, Err(BackendFailure::timeout("slow"))))
                .collect(),
        ));
        let config = EngineConfig::default().with_retry(RetryPolicy::no_retry());
        let verdict = coordinator(pool(3), backend, config)
            .execute(request(three(), Duration::from_secs(60)))
            .await;

        assert!(verdict.degraded);
        assert_eq!(verdict.confidence, 0.0);
        assert_eq!(verdict.dissent.len(), 3);
        assert!(
            verdict
                .dissent
                .iter()
                .all(|r| r.status == StrategyStatus::BackendError)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_partial_verdict() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::from_secs(1), reply("ANSWER: 4")),
            (StrategyId::KeyDifference, Duration::from_secs(2), reply("ANSWER: 4")),
            (StrategyId::Mechanistic, Duration::from_secs(3600), reply("ANSWER: 5")),
        ]));
        let pool = pool(3);
        let started = Instant::now();
        let verdict = coordinator(pool.clone(), backend, EngineConfig::default())
            .execute(request(three(), Duration::from_secs(10)))
            .await;

        assert!(started.elapsed() <= Duration::from_secs(10));
        assert_eq!(verdict.answer.value(), Some("4"));
        assert_eq!(verdict.kind, VerdictKind::Unanimous);
        assert!(!verdict.degraded);
        assert_eq!(verdict.dissent.len(), 1);
        // The hung call ends on its own budget just ahead of the deadline
        let hung = &verdict.dissent[0];
        assert_eq!(hung.status, StrategyStatus::BackendError);
        assert_eq!(hung.failure.as_ref().unwrap().kind, quorum_domain::FailureKind::Timeout);
        assert!(hung.credential.is_some());

        // No credential leaks from the abandoned runner
        assert!(pool.snapshot().iter().all(|s| !s.in_use));
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_cancellation() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::from_secs(1), reply("ANSWER: A")),
            (StrategyId::KeyDifference, Duration::from_secs(3600), reply("ANSWER: A")),
            (StrategyId::Mechanistic, Duration::from_secs(3600), reply("ANSWER: A")),
        ]));
        let coordinator = coordinator(pool(3), backend, EngineConfig::default());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            trigger.cancel();
        });

        let started = Instant::now();
        let verdict = coordinator
            .execute_with_progress(
                request(three(), Duration::from_secs(600)),
                &NoProgress,
                &cancel,
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(6));
        assert_eq!(verdict.answer.value(), Some("A"));
        assert_eq!(verdict.ok_count, 1);
        assert!(verdict.degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_pool_still_yields_verdict() {
        let backend = Arc::new(PersonaBackend::new(vec![]));
        let empty = Arc::new(CredentialPool::new(vec![], PoolPolicy::default()));
        let verdict = coordinator(empty, backend.clone(), EngineConfig::default())
            .execute(request(three(), Duration::from_secs(60)))
            .await;

        assert!(verdict.degraded);
        assert_eq!(verdict.answer, VerdictAnswer::Unavailable);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_mode_runs_first_strategy_only() {
        let backend = Arc::new(PersonaBackend::new(vec![
            (StrategyId::Systematic, Duration::ZERO, reply("ANSWER: C")),
            (StrategyId::KeyDifference, Duration::ZERO, reply("ANSWER: D")),
        ]));
        let config = EngineConfig::default().with_fast(true);
        let verdict = coordinator(pool(2), backend.clone(), config)
            .execute(request(
                vec![StrategyId::Systematic, StrategyId::KeyDifference],
                Duration::from_secs(60),
            ))
            .await;

        assert_eq!(backend.calls(), 1);
        assert_eq!(verdict.total, 1);
        assert_eq!(verdict.answer.value(), Some("C"));
        assert!(!verdict.degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bounded_concurrency() {
        let backend = Arc::new(PersonaBackend::new(
            three()
                .into_iter()
                .map(|s| (s, Duration::from_secs(10), reply("ANSWER: B")))
                .collect(),
        ));
        let config = EngineConfig::default().with_max_concurrency(1);
        let started = Instant::now();
        let verdict = coordinator(pool(3), backend, config)
            .execute(request(three(), Duration::from_secs(120)))
            .await;

        assert_eq!(verdict.kind, VerdictKind::Unanimous);
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_error_text_passes_through() {
        let backend = Arc::new(PersonaBackend::new(vec![(
            StrategyId::Systematic,
            Duration::ZERO,
            reply("I think the second structure is favoured."),
        )]));
        let verdict = coordinator(pool(1), backend, EngineConfig::default())
            .execute(request(vec![StrategyId::Systematic], Duration::from_secs(60)))
            .await;

        assert!(verdict.degraded);
        assert_eq!(
            verdict.answer,
            VerdictAnswer::Unadjudicated {
                strategy: StrategyId::Systematic,
                raw_text: "I think the second structure is favoured.".to_string(),
            }
        );
    }
}
