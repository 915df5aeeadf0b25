//! routegate CLI - Command-line interface
//!
//! A thin command-line surface over the routegate library: one subcommand per
//! gateway operation, JSON on stdout, logs on stderr and in the log file.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::query::{QueryArgs, TableArgs};
use commands::reachability::ReachabilityArgs;
use error::CliError;
use routegate::query::EndpointKind;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "routegate")]
#[command(version)]
#[command(about = "Caching gateway and reachability analysis for an OSRM routing engine", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.routegate/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print a one-line human-readable summary instead of JSON
    #[arg(long, global = true)]
    brief: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fastest route through two or more waypoints
    Route(QueryArgs),

    /// Duration matrix between sources and destinations
    Table(TableArgs),

    /// Round trip or open tour visiting every waypoint
    Trip(QueryArgs),

    /// Snap a timestamped GPS trace to the road network
    Match(QueryArgs),

    /// Nearest road positions to one coordinate
    Nearest(QueryArgs),

    /// Grid points reachable from an origin within each time limit
    Reachability(ReachabilityArgs),

    /// Cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands work on the file itself and need no gateway
    if let Commands::Config { action } = cli.command {
        return commands::config::run(action, cli.config.as_deref());
    }

    let runner = CliRunner::new(cli.config.as_deref())?;
    let brief = cli.brief;

    match cli.command {
        Commands::Route(args) => commands::query::run(&runner, EndpointKind::Route, args, brief),
        Commands::Table(args) => commands::query::run_table(&runner, args, brief),
        Commands::Trip(args) => commands::query::run(&runner, EndpointKind::Trip, args, brief),
        Commands::Match(args) => commands::query::run(&runner, EndpointKind::Match, args, brief),
        Commands::Nearest(args) => {
            commands::query::run(&runner, EndpointKind::Nearest, args, brief)
        }
        Commands::Reachability(args) => commands::reachability::run(&runner, args, brief),
        Commands::Cache { action } => commands::cache::run(&runner, action),
        Commands::Config { .. } => Ok(()),
    }?;

    runner.shutdown();
    Ok(())
}
