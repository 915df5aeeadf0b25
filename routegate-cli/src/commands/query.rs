//! Direct query commands: route, table, trip, match and nearest.

use clap::Args;

use routegate::query::{EndpointKind, Profile, Query, QueryOptions};
use routegate::{Coordinate, GatewayError};

use super::output;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments shared by route, trip, match and nearest.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Coordinates in order, each as lng,lat
    #[arg(required = true, allow_hyphen_values = true, value_name = "LNG,LAT")]
    pub coordinates: Vec<Coordinate>,

    /// Travel profile: driving, walking or cycling (default from config)
    #[arg(long)]
    pub profile: Option<Profile>,

    /// Service option as name=value, e.g. --opt steps=false (repeatable)
    #[arg(long = "opt", value_name = "NAME=VALUE", value_parser = parse_option)]
    pub options: Vec<(String, String)>,
}

/// Arguments of the table command.
#[derive(Debug, Args)]
pub struct TableArgs {
    /// Source coordinate as lng,lat (repeatable)
    #[arg(long = "source", required = true, allow_hyphen_values = true, value_name = "LNG,LAT")]
    pub sources: Vec<Coordinate>,

    /// Destination coordinate as lng,lat (repeatable)
    #[arg(
        long = "destination",
        required = true,
        allow_hyphen_values = true,
        value_name = "LNG,LAT"
    )]
    pub destinations: Vec<Coordinate>,

    /// Travel profile: driving, walking or cycling (default from config)
    #[arg(long)]
    pub profile: Option<Profile>,
}

/// Run a route, trip, match or nearest query.
pub fn run(
    runner: &CliRunner,
    kind: EndpointKind,
    args: QueryArgs,
    brief: bool,
) -> Result<(), CliError> {
    let profile = args
        .profile
        .unwrap_or_else(|| runner.gateway().default_profile());
    let options = QueryOptions::from_pairs(kind, args.options).map_err(GatewayError::from)?;
    let query = Query::new(profile, args.coordinates, options).map_err(GatewayError::from)?;

    execute(runner, &query, brief)
}

/// Run a table query between separate source and destination lists.
pub fn run_table(runner: &CliRunner, args: TableArgs, brief: bool) -> Result<(), CliError> {
    let profile = args
        .profile
        .unwrap_or_else(|| runner.gateway().default_profile());
    let query = Query::table(&args.sources, &args.destinations)
        .map_err(GatewayError::from)?
        .with_profile(profile);

    execute(runner, &query, brief)
}

fn execute(runner: &CliRunner, query: &Query, brief: bool) -> Result<(), CliError> {
    let response = runner.block_on(runner.gateway().cached_query(query))?;

    if brief {
        println!("{}", output::describe_query(query, &response));
        Ok(())
    } else {
        output::print_json(&response)
    }
}

/// Parse a `name=value` option pair.
fn parse_option(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing option name in '{}'", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
