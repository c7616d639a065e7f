//! Backend credentials and their health states.
//!
//! A [`Credential`] is one unit of backend access capacity. Its identity is
//! fixed for the process lifetime; only its [`CredentialHealth`] changes,
//! driven by [`CallOutcome`]s reported back to the pool.

pub mod entities;

pub use entities::{CallOutcome, Credential, CredentialHealth, CredentialId};
