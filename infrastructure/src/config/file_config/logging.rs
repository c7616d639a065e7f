//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving strategy and verdict records
    pub records_path: Option<PathBuf>,
    /// File receiving diagnostic logs in addition to stderr
    pub log_file: Option<PathBuf>,
}
