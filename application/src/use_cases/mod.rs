//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod resolve_verdict;
pub mod run_strategy;
