//! Reachability command.

use clap::Args;

use routegate::fanout::{GridSpec, ReachabilityRequest};
use routegate::query::Profile;
use routegate::{Coordinate, GatewayError};

use super::output;
use crate::error::CliError;
use crate::runner::CliRunner;

#[derive(Debug, Args)]
pub struct ReachabilityArgs {
    /// Origin as lng,lat
    #[arg(long, allow_hyphen_values = true, value_name = "LNG,LAT")]
    pub origin: Coordinate,

    /// Time limit in seconds, repeatable or comma-separated (default from config)
    #[arg(long = "time-limit", value_delimiter = ',', value_name = "SECS")]
    pub time_limits: Vec<u64>,

    /// Grid spacing in degrees (default from config)
    #[arg(long)]
    pub step: Option<f64>,

    /// Grid half-width in degrees (default from config)
    #[arg(long)]
    pub radius: Option<f64>,

    /// Travel profile: driving, walking or cycling (default from config)
    #[arg(long)]
    pub profile: Option<Profile>,
}

/// Run a reachability job.
pub fn run(runner: &CliRunner, args: ReachabilityArgs, brief: bool) -> Result<(), CliError> {
    let defaults = &runner.config().reachability;

    let time_limits = if args.time_limits.is_empty() {
        defaults.time_limits.clone()
    } else {
        args.time_limits
    };
    let grid = GridSpec::new(
        args.step.unwrap_or(defaults.step),
        args.radius.unwrap_or(defaults.radius),
    );
    let profile = args
        .profile
        .unwrap_or_else(|| runner.gateway().default_profile());

    let request = ReachabilityRequest::new(args.origin, time_limits, profile, grid)
        .map_err(GatewayError::from)?;
    let reachability = runner.block_on(runner.gateway().fan_out_reachability(request))?;

    if brief {
        println!("{}", output::describe_reachability(&reachability));
        Ok(())
    } else {
        output::print_json(&reachability)
    }
}
