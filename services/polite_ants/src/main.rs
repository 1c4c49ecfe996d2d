//! Polite ants benchmark binary
//!
//! Usage:
//!   polite-ants --population 10000 --duration 10
//!   polite-ants --config config/ants.toml --workers 1,2,3,4 --output sweep.txt
//!   polite-ants --quiescence sleep --json

mod cli;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use colony_config::ColonyConfig;
use report::SweepRun;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Grace period for stray send tasks once a run's colony is gone
const RUNTIME_SHUTDOWN: Duration = Duration::from_secs(1);

/// Separates reports in a worker sweep
const RULE: &str = "----------------------------------------";

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!("Starting polite ants benchmark");
    let config = args.resolve_config().map_err(|e| {
        error!("Failed to load configuration: {:#}", e);
        e
    })?;
    config.validate()?;

    let sweep = args.worker_sweep(&config);
    info!(
        population = config.population,
        seed_batch = config.seed_batch,
        duration_secs = config.duration_secs,
        quiescence = ?config.quiescence,
        workers = ?sweep,
        "Configuration loaded"
    );

    let mut runs = Vec::with_capacity(sweep.len());
    for workers in sweep {
        let config = ColonyConfig {
            workers,
            ..config.clone()
        };
        config.validate()?;
        let outcome = run_with_workers(&config)?;
        runs.push((config, outcome));
    }

    let sweep_runs: Vec<SweepRun<'_>> = runs
        .iter()
        .map(|(config, outcome)| SweepRun {
            workers: config.workers,
            config,
            outcome,
        })
        .collect();

    let rendered = if args.json {
        report::render_json(&sweep_runs)?
    } else {
        sweep_runs
            .iter()
            .map(report::render_text)
            .collect::<Vec<_>>()
            .join(&format!("{}\n", RULE))
    };

    println!("{rendered}");

    if let Some(path) = &args.output {
        std::fs::write(path, &rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    Ok(())
}

/// One complete run on a fresh runtime sized to `config.workers`
fn run_with_workers(config: &ColonyConfig) -> Result<colony_actors::RunOutcome> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    info!(workers = config.workers, "Runtime started");
    let outcome = runtime.block_on(colony_actors::run(config)).map_err(|e| {
        error!(workers = config.workers, category = e.category(), "Run failed: {}", e);
        e
    })?;

    info!(
        run_id = %outcome.run_id,
        workers = config.workers,
        total_messages = outcome.report.total_messages,
        message_rate = outcome.report.message_rate.unwrap_or_default(),
        exact = outcome.quiescence.is_exact(),
        "Run complete"
    );

    runtime.shutdown_timeout(RUNTIME_SHUTDOWN);
    Ok(outcome)
}

/// Logs go to stderr so stdout carries only the report
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
