//! CLI entrypoint for chem-quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use quorum_application::{
    CredentialPool, NoProgress, ProgressNotifier, ResolveVerdictUseCase, RunStrategyUseCase,
};
use quorum_domain::{ConfigIssue, ImageRef, Problem, Request};
use quorum_infrastructure::{
    ConfigLoader, FileConfig, GeminiBackend, JsonlRecordSink, load_credentials,
};
use quorum_presentation::{
    Cli, ConsoleFormatter, OutputConfig, OutputFormatter, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };
    apply_cli_overrides(&mut config, &cli);

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref());
    info!("Starting chem-quorum");

    // === Configuration ===
    let output = OutputConfig {
        format: config.output.format.unwrap_or_default(),
        color: config.output.color,
        show_progress: config.output.show_progress,
    }
    .with_cli_overrides(&cli);
    output.apply_color_choice();

    let mut issues = config.validate();
    let (resolved, _) = config.to_engine_config();
    let (credentials, credential_issues) = load_credentials(&config.credentials);
    issues.extend(credential_issues);
    report_issues(&issues)?;

    // === Request ===
    let text = match cli.problem.clone() {
        Some(text) => text,
        None => std::io::read_to_string(std::io::stdin()).context("Failed to read problem from stdin")?,
    };
    let mut problem = Problem::try_new(text)?;
    if let Some(uri) = &cli.image {
        problem = problem.with_image(ImageRef::new(uri.clone()));
    }
    let request = Request::new(problem, resolved.strategies, resolved.deadline)?;

    // === Dependency Injection ===
    let pool = Arc::new(CredentialPool::new(credentials, resolved.engine.pool));
    let backend = Arc::new(
        GeminiBackend::from_config(&config.backend).context("Failed to create HTTP client")?,
    );
    info!(
        "Using {} with {} credential(s)",
        backend.model(),
        pool.len()
    );

    let runner = RunStrategyUseCase::new(Arc::clone(&pool), backend, resolved.engine.retry);
    let mut use_case = ResolveVerdictUseCase::new(runner, resolved.engine);
    if let Some(path) = &config.logging.records_path {
        match JsonlRecordSink::new(path) {
            Some(sink) => {
                debug!("Writing records to {}", sink.path().display());
                use_case = use_case.with_record_sink(Arc::new(sink));
            }
            None => warn!("Records disabled: cannot write {}", path.display()),
        }
    }

    // Ctrl-C stops outstanding strategies; the verdict uses what finished
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, resolving with completed strategies");
            ctrl_c_token.cancel();
        }
    });

    let progress: Box<dyn ProgressNotifier> = if !output.show_progress {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };
    let verdict = use_case
        .execute_with_progress(request, progress.as_ref(), &cancel)
        .await;

    for status in pool.snapshot() {
        debug!(
            "Credential {}: {:?} ({} consecutive failures)",
            status.id, status.health, status.consecutive_failures
        );
    }

    println!("{}", ConsoleFormatter.render(&verdict, output.format));

    Ok(())
}

/// Command-line flags take precedence over every config source
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.strategies.is_empty() {
        config.engine.strategies = cli.strategies.clone();
    }
    if let Some(deadline) = cli.deadline {
        config.engine.deadline_seconds = deadline;
    }
    if cli.fast {
        config.engine.fast = true;
    }
    if cli.no_synthesis {
        config.engine.synthesis = false;
    }
    if let Some(path) = &cli.records {
        config.logging.records_path = Some(path.clone());
    }
}

/// Print every issue; stop when any of them is an error
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        eprintln!("{}", issue);
    }
    let errors = issues.iter().filter(|i| i.is_error()).count();
    if errors > 0 {
        bail!("{} configuration error(s), see above", errors);
    }
    Ok(())
}

/// Initialize logging based on verbosity level, optionally teeing to a file
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "chem-quorum.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));

            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .init();
            None
        }
    }
}
