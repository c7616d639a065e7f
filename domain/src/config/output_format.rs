//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a verdict is rendered for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Verdict, vote breakdown and every strategy's result
    Full,
    /// Only the final answer with its confidence (default)
    #[default]
    Answer,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "answer" => Ok(Self::Answer),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {}", other)),
        }
    }
}
