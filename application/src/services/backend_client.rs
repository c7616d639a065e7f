//! Backend client adapter
//!
//! Wraps a [`ReasoningBackend`] with the retry policy: a hard timeout per
//! attempt, jittered exponential backoff, and retries for transient
//! failures only. All retry logic for backend calls lives here.

use crate::config::RetryPolicy;
use crate::ports::reasoning_backend::ReasoningBackend;
use quorum_domain::{BackendFailure, Credential, Prompt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Uniform call contract over a reasoning backend
pub struct BackendClient<B: ReasoningBackend + ?Sized> {
    backend: Arc<B>,
    policy: RetryPolicy,
}

impl<B: ReasoningBackend + ?Sized> Clone for BackendClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            policy: self.policy,
        }
    }
}

impl<B: ReasoningBackend + ?Sized> BackendClient<B> {
    pub fn new(backend: Arc<B>, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Call the backend with `credential`, spending at most `budget` in
    /// total across attempts and backoff sleeps.
    ///
    /// Only retryable failures (timeouts, transient transport errors) are
    /// retried. Rate limits, auth errors and malformed responses are returned
    /// at once. When the budget cannot cover another attempt, the last
    /// observed failure is returned.
    pub async fn call(
        &self,
        credential: &Credential,
        prompt: &Prompt,
        budget: Duration,
    ) -> Result<String, BackendFailure> {
        let deadline = Instant::now() + budget;
        let mut retry = 0;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(BackendFailure::timeout("call budget exhausted"));
            }
            let attempt_timeout = self.policy.attempt_timeout.min(remaining);

            let outcome = match tokio::time::timeout(
                attempt_timeout,
                self.backend.call(credential.token(), prompt, attempt_timeout),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(BackendFailure::timeout(format!(
                    "no response within {}ms",
                    attempt_timeout.as_millis()
                ))),
            };

            let failure = match outcome {
                Ok(text) => {
                    debug!(
                        "Backend call with {} succeeded after {} retries",
                        credential.id(),
                        retry
                    );
                    return Ok(text);
                }
                Err(failure) => failure,
            };

            if !failure.is_retryable() {
                debug!("Backend call with {} failed: {}", credential.id(), failure);
                return Err(failure);
            }
            if retry >= self.policy.max_retries {
                warn!(
                    "Backend call with {} failed after {} retries: {}",
                    credential.id(),
                    retry,
                    failure
                );
                return Err(failure);
            }

            let delay = self.policy.backoff(retry);
            if Instant::now() + delay >= deadline {
                debug!("No budget left to retry after: {}", failure);
                return Err(failure);
            }

            warn!(
                "Backend call with {} failed ({}), retrying in {}ms",
                credential.id(),
                failure,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
