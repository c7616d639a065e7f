//! Application layer for chem-quorum
//!
//! This crate contains use cases, port definitions, services and application
//! configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod services;
pub mod use_cases;

// Re-export commonly used types
pub use config::{EngineConfig, PoolPolicy, RetryPolicy};
pub use ports::{
    progress::{NoProgress, ProgressNotifier},
    reasoning_backend::ReasoningBackend,
    record_sink::{NoRecordSink, RecordSink},
};
pub use services::{
    backend_client::BackendClient,
    credential_pool::{CredentialLease, CredentialPool, CredentialStatus, PoolError},
};
pub use use_cases::resolve_verdict::ResolveVerdictUseCase;
pub use use_cases::run_strategy::{DEFAULT_RUNNER_ATTEMPTS, RunStrategyUseCase};
