//! CLI entrypoint for Agent Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use council_application::{Engine, LoopOptions, LoopState, NoProgress, ProgressNotifier};
use council_domain::{OutputFormat, Task};
use council_infrastructure::{
    ConfigLoader, FileConfig, JsonlStateJournal, ProcessAgentGateway, RandomJitter, replay,
};
use council_presentation::{Cli, ConsoleFormatter, LoopReport, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting Agent Council");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let issues = config.validate();
    for issue in &issues {
        if issue.is_error() {
            eprintln!("{}", issue.to_string().red());
        } else {
            eprintln!("{}", issue.to_string().yellow());
        }
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("configuration has errors; see above");
    }
    if !config.output.color {
        colored::control::set_override(false);
    }

    let Some(description) = cli.task.clone() else {
        bail!("A task description is required. Try `agent-council --help`.");
    };
    let task = Task::new(
        format!("task-{}", chrono::Utc::now().format("%Y%m%d%H%M%S")),
        description,
    )?
    .with_required_capabilities(&cli.capabilities);
    let options = loop_options(&cli, &config);

    // === Dependency Injection ===
    let gateway = Arc::new(ProcessAgentGateway::new(config.agent_commands()));
    let progress: Arc<dyn ProgressNotifier> = if cli.quiet {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    };

    let mut builder = Engine::builder(gateway, config.registry())
        .with_config(config.engine_config())
        .with_progress(progress)
        .with_jitter(Arc::new(RandomJitter));

    let journal_path = cli
        .journal
        .clone()
        .or_else(|| config.engine.journal.as_deref().map(expand_home));
    let replayed = match journal_path {
        Some(ref path) => {
            let replayed = replay(path)?;
            if replayed.skipped_lines > 0 {
                warn!(
                    "Skipped {} malformed journal lines in {}",
                    replayed.skipped_lines,
                    path.display()
                );
            }
            builder = builder.with_journal(Arc::new(JsonlStateJournal::open(path)?));
            replayed.entries
        }
        None => Vec::new(),
    };

    let engine = builder.build();
    if !replayed.is_empty() {
        engine.restore(&replayed);
    }

    // === Run ===
    let loop_id = engine.submit_task(task, options)?;

    let status = tokio::select! {
        status = engine.wait_for(loop_id) => status,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("{}", "Interrupted, stopping...".yellow());
            engine.stop_loop(loop_id);
            engine.wait_for(loop_id).await
        }
    }
    .context("task loop vanished")?;
    engine.shutdown().await;

    // === Output ===
    let report = LoopReport {
        status,
        rounds: engine.ledger_history(loop_id),
    };
    let format = cli
        .output
        .map(OutputFormat::from)
        .or(config.output.format)
        .unwrap_or_default();
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };
    println!("{}", output);

    Ok(if report.status.state == LoopState::Failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Initialize logging based on verbosity level, optionally mirrored to a
/// daily rolling file.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let (file_layer, guard) = match cli.log_dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "agent-council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Loop options from `[scheduler]`, overridden by command-line flags.
fn loop_options(cli: &Cli, config: &FileConfig) -> LoopOptions {
    let mut options = config.loop_options();
    if let Some(max_agents) = cli.max_agents {
        options = options.with_max_agents(max_agents);
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        options = options.with_per_agent_timeout(Duration::from_millis(timeout_ms));
    }
    if let Some(strategy) = cli.strategy {
        options = options.with_strategy(strategy);
    }
    if let Some(complexity) = cli.complexity {
        options = options.with_complexity(complexity);
    }
    if let Some(rounds) = cli.max_rounds() {
        options = options.with_max_rounds(rounds);
    }
    options
        .with_experimental(cli.experimental)
        .with_stop_on_quorum(cli.stop_on_quorum)
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
