//! Configuration file loading for chem-quorum
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `CHEM_QUORUM_*`
//! 2. `--config <path>` specified file
//! 3. Project root: `./chem-quorum.toml` or `./.chem-quorum.toml`
//! 4. Global: `$XDG_CONFIG_HOME/chem-quorum/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileBackendConfig, FileConfig, FileCredentialsConfig, FileEngineConfig, FileLoggingConfig,
    FileOutputConfig, ResolvedEngine,
};
pub use loader::ConfigLoader;
