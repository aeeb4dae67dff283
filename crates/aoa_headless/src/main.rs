//! Headless Age of Agents match runner.
//!
//! This binary plays matches without any presentation. Match reports and
//! other machine-readable output go to stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Play one match between two presets
//! cargo run -p aoa_headless -- run --a scripted:balanced --b scripted:rush
//!
//! # Load a match config, override the turn limit, include the game log
//! cargo run -p aoa_headless -- run --config match.ron --turns 30 --log
//!
//! # Print the rule tables
//! cargo run -p aoa_headless -- rules
//!
//! # Print side B's opening observation
//! cargo run -p aoa_headless -- observe --side B
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use aoa_core::data::RuleBook;
use aoa_core::player::PlayerId;
use aoa_core::simulation::Simulation;
use aoa_headless::{
    agent::Agent,
    config::{AgentSpec, ConfigError, MatchConfig},
    runner::MatchRunner,
};

#[derive(Parser)]
#[command(name = "aoa_headless")]
#[command(about = "Headless Age of Agents match runner")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one match and print its report
    Run {
        /// Match config file (RON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Agent for side A: idle, scripted:<preset>, strategy:<file>, cmd:<program> [args]
        #[arg(long)]
        a: Option<AgentSpec>,

        /// Agent for side B
        #[arg(long)]
        b: Option<AgentSpec>,

        /// Turn limit
        #[arg(short, long)]
        turns: Option<u32>,

        /// Per-call agent timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Include the full game log in the report
        #[arg(long)]
        log: bool,
    },

    /// Print the rule tables as JSON
    Rules,

    /// Print a side's opening observation as JSON
    Observe {
        /// Observing side
        #[arg(short, long, default_value = "A", value_parser = parse_side)]
        side: PlayerId,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("Failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

fn parse_side(text: &str) -> Result<PlayerId, String> {
    PlayerId::from_name(text).ok_or_else(|| format!("expected A or B, got {text:?}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for reports)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            a,
            b,
            turns,
            timeout,
            log,
        } => cmd_run(config, a, b, turns, timeout, log),
        Commands::Rules => cmd_rules(),
        Commands::Observe { side } => cmd_observe(side),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Play one match
fn cmd_run(
    config_path: Option<PathBuf>,
    a: Option<AgentSpec>,
    b: Option<AgentSpec>,
    turns: Option<u32>,
    timeout: Option<u64>,
    log: bool,
) -> Result<(), CliError> {
    let mut config = match config_path {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(spec) = a {
        config.player_a = spec;
    }
    if let Some(spec) = b {
        config.player_b = spec;
    }
    if let Some(turns) = turns {
        config.turn_limit = turns;
    }
    if let Some(secs) = timeout {
        config.agent_timeout_secs = secs;
    }

    tracing::info!(
        a = %config.player_a,
        b = %config.player_b,
        turn_limit = config.turn_limit,
        timeout_secs = config.agent_timeout_secs,
        "Match configuration"
    );

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    let mut report = runtime.block_on(async {
        let mut agent_a = config.player_a.build()?;
        let mut agent_b = config.player_b.build()?;
        tracing::debug!(a = agent_a.name(), b = agent_b.name(), "agents ready");

        let runner = MatchRunner::from_config(&config);
        let report = runner.run_until(&mut agent_a, &mut agent_b, ctrl_c()).await;
        Ok::<_, ConfigError>(report)
    })?;

    if !log {
        report.log.clear();
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Print the rule tables
fn cmd_rules() -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(&RuleBook::collect())?);
    Ok(())
}

/// Print a side's opening observation
fn cmd_observe(side: PlayerId) -> Result<(), CliError> {
    let sim = Simulation::default();
    let prepared = sim.begin_turn(&sim.new_game());
    println!("{}", serde_json::to_string_pretty(&sim.observe(&prepared, side))?);
    Ok(())
}

/// Completes on Ctrl-C. Never completes if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}
