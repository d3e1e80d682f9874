mod commands;
mod config;
mod element_types;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, inspect, normalize, CheckArgs, InspectArgs, NormalizeArgs};
use config::Config;
use std::path::PathBuf;

/// Blocklist CLI - inspect and repair stored block list values
#[derive(Parser, Debug)]
#[command(name = "blocklist")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to blocklist.config.json in the working directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the blocks of a stored value
    Inspect(InspectArgs),

    /// Check integrity and cardinality; exits non-zero on problems
    Check(CheckArgs),

    /// Load and save a stored value, dropping corrupt entries
    Normalize(NormalizeArgs),
}

async fn run(cli: Cli, cwd: &str) -> anyhow::Result<()> {
    let config = Config::load(cwd, cli.config.as_deref())?;

    match cli.command {
        Command::Inspect(args) => inspect(args, &config, cwd).await,
        Command::Check(args) => check(args, &config, cwd).await,
        Command::Normalize(args) => normalize(args, &config, cwd).await,
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match std::env::current_dir() {
        Ok(cwd) => run(cli, &cwd.display().to_string()).await,
        Err(err) => Err(err.into()),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
