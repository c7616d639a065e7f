//! Reasoning backend port
//!
//! Defines the single request/response contract with the external reasoning
//! backend. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use quorum_domain::{BackendFailure, Prompt};
use std::time::Duration;

/// Gateway to the reasoning backend
///
/// One call is one opaque request/response pair; no streaming. The
/// implementation classifies every failure into a
/// [`FailureKind`](quorum_domain::FailureKind) so callers can decide whether
/// to retry, switch credential, or give up.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Send `prompt` using the credential `token`.
    ///
    /// `timeout` is the budget for this attempt. Callers enforce it as well,
    /// so an implementation that ignores it is still bounded.
    async fn call(
        &self,
        token: &str,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<String, BackendFailure>;
}
