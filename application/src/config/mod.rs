//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`EngineConfig`]: coordinator concurrency, quorum and fast mode
//! - [`RetryPolicy`]: per-attempt timeout and backoff for backend calls
//! - [`PoolPolicy`]: credential failure threshold and cooldown curve

pub mod engine;
pub mod pool_policy;
pub mod retry_policy;

pub use engine::EngineConfig;
pub use pool_policy::PoolPolicy;
pub use retry_policy::RetryPolicy;
