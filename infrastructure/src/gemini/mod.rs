//! Gemini reasoning backend
//!
//! One `generateContent` call per attempt. Timeouts, retries and credential
//! rotation are handled by the application layer; this adapter only speaks
//! the wire format and classifies failures.

pub mod backend;
pub mod types;

pub use backend::GeminiBackend;
pub use types::GenerationConfig;
