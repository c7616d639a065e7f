//! Presentation-level configuration
//!
//! Resolved output settings: file values overridden by command-line flags.

use crate::cli::commands::Cli;
use quorum_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Apply command-line overrides on top of file settings
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(format) = cli.output {
            self.format = format.into();
        }
        if cli.no_color {
            self.color = false;
        }
        if cli.quiet {
            self.show_progress = false;
        }
        // JSON goes to pipes; keep stdout and stderr clean
        if self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }

    /// Make the color choice effective for every formatter and reporter
    pub fn apply_color_choice(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
