//! Core domain concepts shared across all subdomains.
//!
//! - [`problem::Problem`]: the problem text and optional image
//! - [`strategy::StrategyId`]: reasoning strategies
//! - [`request::Request`]: a validated request for the consensus engine
//! - [`failure::BackendFailure`]: classified reasoning backend failures
//! - [`error::DomainError`]: request construction errors

pub mod error;
pub mod failure;
pub mod problem;
pub mod request;
pub mod strategy;
pub mod string;
