//! Infrastructure layer for chem-quorum
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod credentials;
pub mod gemini;
pub mod logging;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileBackendConfig, FileConfig, FileCredentialsConfig, FileEngineConfig,
    FileLoggingConfig, FileOutputConfig, ResolvedEngine,
};
pub use credentials::{load_credentials, load_credentials_with};
pub use gemini::{GeminiBackend, GenerationConfig};
pub use logging::JsonlRecordSink;
