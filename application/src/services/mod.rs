//! Stateful services shared by the use cases
//!
//! - [`credential_pool::CredentialPool`]: process-wide credential health
//! - [`backend_client::BackendClient`]: retry and timeout policy around the
//!   reasoning backend port

pub mod backend_client;
pub mod credential_pool;
