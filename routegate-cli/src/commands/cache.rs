//! Cache management CLI commands.

use clap::Subcommand;
use serde_json::json;

use super::output;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show the active backend and approximate entry count
    Stats,
    /// Remove every cached entry from both tiers
    Clear,
}

/// Run a cache subcommand.
pub fn run(runner: &CliRunner, action: CacheAction) -> Result<(), CliError> {
    let gateway = runner.gateway();

    match action {
        CacheAction::Stats => {
            let stats = runner.block_on(gateway.cache_stats());
            output::print_json(&stats)
        }
        CacheAction::Clear => {
            runner.block_on(gateway.clear_cache());
            output::print_json(&json!({ "cleared": true }))
        }
    }
}
