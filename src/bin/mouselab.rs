//! Mouselab CLI - exact planning over partially revealed reward trees
//!
//! This CLI provides:
//! - Exact solutions of registered environments, with optional Q or policy tables
//! - Inspection and JSON conversion of saved tables
//! - A listing of the registered environment settings

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mouselab")]
#[command(version, about = "Exact solver for Mouselab planning environments", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an environment and optionally build its Q or policy table
    Solve(Box<mouselab::cli::commands::solve::SolveArgs>),

    /// Inspect or convert a saved table
    Tables(mouselab::cli::commands::tables::TablesArgs),

    /// List registered environment settings
    ListEnvs(mouselab::cli::commands::list_envs::ListEnvsArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Solve(args) => mouselab::cli::commands::solve::execute(*args),
        Commands::Tables(args) => mouselab::cli::commands::tables::execute(args),
        Commands::ListEnvs(args) => mouselab::cli::commands::list_envs::execute(args),
    }
}
