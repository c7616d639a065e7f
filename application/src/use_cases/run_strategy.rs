//! Run Strategy use case
//!
//! Executes one reasoning strategy end-to-end: prompt construction, backend
//! call through a borrowed credential, and answer normalization. Every exit
//! path yields exactly one [`StrategyResult`]; failures never escape as
//! errors.

use crate::config::RetryPolicy;
use crate::ports::reasoning_backend::ReasoningBackend;
use crate::services::backend_client::BackendClient;
use crate::services::credential_pool::{CredentialPool, PoolError};
use quorum_domain::{
    BackendFailure, CallOutcome, CredentialId, FailureKind, Prompt, PromptTemplate, Request,
    StrategyId, StrategyResult, parse_answer,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default credential attempts per strategy (first try plus two more)
pub const DEFAULT_RUNNER_ATTEMPTS: u32 = 3;

/// Slack kept between the adapter's budget and the request deadline, so a
/// hung backend surfaces as its own failure rather than a cut-off
const DEADLINE_MARGIN: Duration = Duration::from_millis(50);

/// Attempts made so far and the credential last leased
#[derive(Debug, Default)]
struct Provenance {
    attempts: u32,
    credential: Option<CredentialId>,
}

/// Use case for running a single strategy against the backend
pub struct RunStrategyUseCase<B: ReasoningBackend + ?Sized + 'static> {
    pool: Arc<CredentialPool>,
    client: BackendClient<B>,
    max_attempts: u32,
}

impl<B: ReasoningBackend + ?Sized + 'static> Clone for RunStrategyUseCase<B> {
    fn clone(&self) -> Self {
        Self {
            pool: Arc::clone(&self.pool),
            client: self.client.clone(),
            max_attempts: self.max_attempts,
        }
    }
}

impl<B: ReasoningBackend + ?Sized + 'static> RunStrategyUseCase<B> {
    pub fn new(pool: Arc<CredentialPool>, backend: Arc<B>, retry: RetryPolicy) -> Self {
        Self {
            pool,
            client: BackendClient::new(backend, retry),
            max_attempts: DEFAULT_RUNNER_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn pool(&self) -> &Arc<CredentialPool> {
        &self.pool
    }

    /// Run `strategy` for `request`, returning by `deadline` at the latest.
    ///
    /// The backend is given the time left before the deadline, less a small
    /// margin, so a hung call ends as a `BackendError` carrying its failure.
    /// Reaching the deadline otherwise, or cancelling `cancel`, abandons the
    /// in-flight work, returns its credential to the pool untouched, and
    /// yields a `Timeout` result that still names the credential leased.
    pub async fn execute(
        &self,
        request: &Request,
        strategy: &StrategyId,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> StrategyResult {
        let prompt = PromptTemplate::build(request.problem(), strategy);
        self.execute_prompt(strategy, &prompt, deadline, cancel).await
    }

    /// Run an already built prompt, reported under `strategy`, with the same
    /// deadline and cancellation handling as [`execute`](Self::execute).
    pub async fn execute_prompt(
        &self,
        strategy: &StrategyId,
        prompt: &Prompt,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> StrategyResult {
        let started = Instant::now();
        let mut provenance = Provenance::default();

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Strategy {} cancelled", strategy);
                None
            }
            result = self.attempt(strategy, prompt, deadline, &mut provenance) => Some(result),
            _ = tokio::time::sleep_until(deadline) => {
                debug!("Strategy {} reached the deadline", strategy);
                None
            }
        };

        let result = finished.unwrap_or_else(|| {
            StrategyResult::timeout(strategy.clone())
                .with_credential(provenance.credential)
                .with_attempts(provenance.attempts)
        });
        result.with_latency(started.elapsed())
    }

    /// Credential attempts. On an empty pool or a rate limit, wait one
    /// backoff and try again with whatever credential the pool yields next.
    async fn attempt(
        &self,
        strategy: &StrategyId,
        prompt: &Prompt,
        deadline: Instant,
        provenance: &mut Provenance,
    ) -> StrategyResult {
        let mut last_failure: Option<BackendFailure> = None;

        for attempt in 1..=self.max_attempts {
            provenance.attempts = attempt;
            let lease = match self.pool.acquire() {
                Ok(lease) => lease,
                Err(PoolError::Empty) => {
                    debug!(
                        "Strategy {}: no credential available (attempt {}/{})",
                        strategy, attempt, self.max_attempts
                    );
                    if attempt < self.max_attempts {
                        self.pause(attempt).await;
                    }
                    continue;
                }
            };
            let credential = lease.id().clone();
            provenance.credential = Some(credential.clone());

            let budget = deadline
                .saturating_duration_since(Instant::now())
                .saturating_sub(DEADLINE_MARGIN);
            let outcome = self.client.call(lease.credential(), prompt, budget).await;

            match outcome {
                Ok(raw) => {
                    lease.release(CallOutcome::Success);
                    return Self::normalize(strategy, raw)
                        .with_credential(Some(credential))
                        .with_attempts(attempt);
                }
                Err(failure) => {
                    lease.release(CallOutcome::from_failure(failure.kind));
                    if failure.kind == FailureKind::RateLimited && attempt < self.max_attempts {
                        warn!(
                            "Strategy {}: credential {} rate limited, switching",
                            strategy, credential
                        );
                        last_failure = Some(failure);
                        self.pause(attempt).await;
                        continue;
                    }
                    warn!("Strategy {} failed: {}", strategy, failure);
                    return StrategyResult::backend_error(strategy.clone(), Some(failure))
                        .with_credential(Some(credential))
                        .with_attempts(attempt);
                }
            }
        }

        match &last_failure {
            Some(failure) => warn!("Strategy {} gave up: {}", strategy, failure),
            None => warn!("Strategy {} gave up: no credential available", strategy),
        }
        StrategyResult::backend_error(strategy.clone(), last_failure)
            .with_credential(provenance.credential.clone())
            .with_attempts(self.max_attempts)
    }

    async fn pause(&self, attempt: u32) {
        let delay = self.client.policy().backoff(attempt.saturating_sub(1));
        tokio::time::sleep(delay).await;
    }

    fn normalize(strategy: &StrategyId, raw: String) -> StrategyResult {
        match parse_answer(&raw) {
            Ok(answer) => {
                info!("Strategy {} answered {}", strategy, answer.value);
                StrategyResult::ok(strategy.clone(), answer, raw)
            }
            Err(e) => {
                warn!("Strategy {} returned unparsable output: {}", strategy, e);
                StrategyResult::parse_error(strategy.clone(), raw, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolPolicy;
    use async_trait::async_trait;
    use quorum_domain::{Credential, CredentialHealth, Problem, StrategyStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Backend that replays scripted outcomes and records the tokens used
    struct ScriptedBackend {
        outcomes: Mutex<VecDeque<(Duration, Result<String, BackendFailure>)>>,
        tokens: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(outcomes: Vec<Result<String, BackendFailure>>) -> Self {
            Self::delayed(outcomes.into_iter().map(|o| (Duration::ZERO, o)).collect())
        }

        fn delayed(outcomes: Vec<(Duration, Result<String, BackendFailure>)>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                tokens: Mutex::new(Vec::new()),
            }
        }

        fn tokens(&self) -> Vec<String> {
            self.tokens.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReasoningBackend for ScriptedBackend {
        async fn call(
            &self,
            token: &str,
            _prompt: &Prompt,
            _timeout: Duration,
        ) -> Result<String, BackendFailure> {
            self.tokens.lock().unwrap().push(token.to_string());
            let (delay, outcome) = self
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or((Duration::ZERO, Err(BackendFailure::unknown("script exhausted"))));
            tokio::time::sleep(delay).await;
            outcome
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

    fn request() -> Request {
        Request::new(
            Problem::try_new("Which carbocation is most stable?").unwrap(),
            vec![StrategyId::Systematic],
            Duration::from_secs(60),
        )
        .unwrap()
    }

    fn runner(pool: Arc<CredentialPool>, backend: Arc<ScriptedBackend>) -> RunStrategyUseCase<ScriptedBackend> {
        RunStrategyUseCase::new(pool, backend, RetryPolicy::default())
    }

    async fn run(runner: &RunStrategyUseCase<ScriptedBackend>, budget: Duration) -> StrategyResult {
        runner
            .execute(
                &request(),
                &StrategyId::Systematic,
                Instant::now() + budget,
                &CancellationToken::new(),
            )
            .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_ok_result() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(
            "Step 1: compare\nANSWER: (B)\nCONFIDENCE: 80%".into(),
        )]));
        let result = run(&runner(pool(1), backend), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::Ok);
        assert_eq!(result.answer.as_ref().unwrap().value, "B");
        assert_eq!(result.credential.as_ref().unwrap().as_str(), "k1");
        assert_eq!(result.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparsable_output_is_parse_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("   ".into())]));
        let result = run(&runner(pool(1), backend), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::ParseError);
        assert!(result.parse_error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_switches_credential() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendFailure::rate_limited("429")),
            Ok("ANSWER: 7".into()),
        ]));
        let pool = pool(2);
        let result = run(&runner(pool.clone(), backend.clone()), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::Ok);
        assert_eq!(result.attempts, 2);
        assert_eq!(backend.tokens(), vec!["t1", "t2"]);
        assert!(matches!(
            pool.snapshot()[0].health,
            CredentialHealth::Cooldown { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_three_attempts() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendFailure::rate_limited("429")),
            Err(BackendFailure::rate_limited("429")),
            Err(BackendFailure::rate_limited("429")),
            Ok("ANSWER: unused".into()),
        ]));
        let result = run(&runner(pool(3), backend.clone()), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::BackendError);
        assert_eq!(result.failure.as_ref().unwrap().kind, FailureKind::RateLimited);
        assert_eq!(backend.tokens().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auth_error_is_not_retried() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Err(BackendFailure::auth("401")),
            Ok("ANSWER: unused".into()),
        ]));
        let result = run(&runner(pool(2), backend.clone()), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::BackendError);
        assert_eq!(backend.tokens().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_pool_never_contacts_backend() {
        let pool = Arc::new(
            CredentialPool::new(
                vec![Credential::new("k1", "t1"), Credential::new("k2", "t2")],
                PoolPolicy::default(),
            )
            .with_health(&CredentialId::new("k1"), CredentialHealth::Exhausted)
            .with_health(&CredentialId::new("k2"), CredentialHealth::Exhausted),
        );
        let backend = Arc::new(ScriptedBackend::new(vec![Ok("ANSWER: A".into())]));
        let result = run(&runner(pool, backend.clone()), Duration::from_secs(60)).await;

        assert_eq!(result.status, StrategyStatus::BackendError);
        assert!(result.failure.is_none());
        assert!(result.credential.is_none());
        assert!(backend.tokens().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_is_backend_error_within_deadline() {
        let hung = || (Duration::from_secs(3600), Ok("ANSWER: late".to_string()));
        let backend = Arc::new(ScriptedBackend::delayed(vec![hung(), hung(), hung()]));
        let pool = pool(1);
        let started = Instant::now();
        let result = run(&runner(pool.clone(), backend.clone()), Duration::from_secs(120)).await;

        assert_eq!(result.status, StrategyStatus::BackendError);
        assert_eq!(result.failure.as_ref().unwrap().kind, FailureKind::Timeout);
        assert_eq!(result.credential.as_ref().unwrap().as_str(), "k1");
        assert_eq!(result.attempts, 1);
        assert_eq!(backend.tokens().len(), 2);
        assert!(started.elapsed() <= Duration::from_secs(120));

        let status = &pool.snapshot()[0];
        assert!(!status.in_use);
        assert_eq!(status.consecutive_failures, 1);
        assert_eq!(status.health, CredentialHealth::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cut_off_keeps_provenance() {
        // Rate limited just before the deadline: the switch backoff outlives it
        let backend = Arc::new(ScriptedBackend::delayed(vec![(
            Duration::from_millis(9_900),
            Err(BackendFailure::rate_limited("429")),
        )]));
        let pool = pool(2);
        let started = Instant::now();
        let result = run(&runner(pool.clone(), backend), Duration::from_secs(10)).await;

        assert_eq!(result.status, StrategyStatus::Timeout);
        assert!(result.failure.is_none());
        assert_eq!(result.credential.as_ref().unwrap().as_str(), "k1");
        assert_eq!(result.attempts, 1);
        assert!(started.elapsed() <= Duration::from_secs(10));
        assert!(pool.snapshot().iter().all(|s| !s.in_use));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_releases_credential() {
        let backend = Arc::new(ScriptedBackend::delayed(vec![(
            Duration::from_secs(3600),
            Ok("ANSWER: late".into()),
        )]));
        let pool = pool(1);
        let runner = runner(pool.clone(), backend);
        let cancel = CancellationToken::new();

        let handle = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                runner
                    .execute(
                        &request(),
                        &StrategyId::Systematic,
                        Instant::now() + Duration::from_secs(600),
                        &cancel,
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(pool.snapshot()[0].in_use);

        cancel.cancel();
        let result = handle.await.unwrap();
        assert_eq!(result.status, StrategyStatus::Timeout);
        assert_eq!(result.credential.as_ref().unwrap().as_str(), "k1");

        // Abandoned borrow: credential back in the pool, health untouched
        let status = &pool.snapshot()[0];
        assert!(!status.in_use);
        assert_eq!(status.consecutive_failures, 0);
    }
}
