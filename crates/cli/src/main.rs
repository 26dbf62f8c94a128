//! Tenet CLI
//!
//! Evaluate declarative rulesets against statically configured accessors.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tenet_rules::{EngineConfig, RuleEngine};
use tracing_subscriber::{EnvFilter, fmt};

/// Tenet CLI: evaluate and inspect rulesets.
#[derive(Parser, Debug)]
#[command(name = "tenet", version, about)]
struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long, env = "TENET_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate a ruleset and report the first failing parameter.
    Eval(commands::eval::EvalArgs),
    /// Show the accessor requests a ruleset would issue.
    Plan(commands::plan::PlanArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    let engine = RuleEngine::from_config(&config)?;

    match cli.command {
        Command::Eval(args) => commands::eval::run(&engine, &args, &cli.format).await,
        Command::Plan(args) => commands::plan::run(&engine, &args, &cli.format),
    }
}
