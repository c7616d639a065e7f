//! CLI command definitions

use clap::{Parser, ValueEnum};
use quorum_domain::OutputFormat;
use std::path::PathBuf;

/// Output format selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    /// Verdict, vote distribution and every strategy's outcome
    Full,
    /// Only the adjudicated answer and its confidence
    Answer,
    /// The verdict as JSON
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Full => OutputFormat::Full,
            CliOutputFormat::Answer => OutputFormat::Answer,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for chem-quorum
#[derive(Parser, Debug)]
#[command(name = "chem-quorum")]
#[command(author, version, about = "Multi-strategy consensus for chemistry problems")]
#[command(long_about = r#"
chem-quorum reasons about a problem with several independent strategies,
each spreading its backend calls over a pool of API keys, and arbitrates
their answers into one verdict with an agreement-based confidence.

Configuration files are loaded from (in priority order):
1. CHEM_QUORUM_* environment variables
2. --config <path>     Explicit config file
3. ./chem-quorum.toml  Project-level config
4. ~/.config/chem-quorum/config.toml   Global config

API keys are read from GEMINI_API_KEYS (comma-separated) unless
credentials.keys_env says otherwise.

Example:
  chem-quorum "Which is more acidic: phenol or ethanol? (A) phenol (B) ethanol"
  chem-quorum -s systematic -s mechanistic --deadline 60 "Rank the carbocations..."
  chem-quorum --image gs://bucket/scheme.png "Identify product X"
  chem-quorum --image ./question.png "Which option shows NGP?"
"#)]
pub struct Cli {
    /// The problem to solve (read from stdin when omitted)
    pub problem: Option<String>,

    /// Image forwarded with the problem: gs:// or http(s) URI, or a local file
    #[arg(short, long, value_name = "URI|PATH")]
    pub image: Option<String>,

    /// Strategies to run, in tie-break order (can be specified multiple times)
    #[arg(short, long = "strategy", value_name = "STRATEGY")]
    pub strategies: Vec<String>,

    /// Overall deadline in seconds
    #[arg(short, long, value_name = "SECONDS")]
    pub deadline: Option<u64>,

    /// Resolve with the first strategy only
    #[arg(long)]
    pub fast: bool,

    /// Skip the arbitrator review of disagreeing answers
    #[arg(long)]
    pub no_synthesis: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<CliOutputFormat>,

    /// Append strategy and verdict records to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub records: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
