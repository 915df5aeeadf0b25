//! Output rendering shared by commands.

use serde::Serialize;
use serde_json::Value;

use routegate::fanout::Reachability;
use routegate::query::{EndpointKind, Query};
use routegate::service::{QueryResponse, QuerySummary};

use crate::error::CliError;

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format seconds as `1h 5m`, `3m 20s` or `42s`.
pub fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format meters as `1.2 km` or `850 m`.
pub fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} m", meters.max(0.0))
    }
}

/// One-line description of a direct query response.
pub fn describe_query(query: &Query, response: &QueryResponse) -> String {
    let mut line = match &response.summary {
        Some(QuerySummary::Table { total_combinations }) => {
            format!("table: {} combinations", total_combinations)
        }
        Some(QuerySummary::Trip {
            total_distance,
            total_duration,
            waypoint_count,
            efficiency_score,
        }) => format!(
            "trip: {} waypoints, {}, {}, efficiency {}%",
            waypoint_count,
            format_duration(*total_duration),
            format_distance(*total_distance),
            efficiency_score
        ),
        Some(QuerySummary::Match {
            confidence,
            matched_points,
            total_distance,
            total_duration,
        }) => format!(
            "match: {} points, confidence {:.2}, {}, {}",
            matched_points,
            confidence,
            format_duration(*total_duration),
            format_distance(*total_distance)
        ),
        None => describe_body(query.kind(), &response.body),
    };
    if response.cached {
        line.push_str(" (cached)");
    }
    line
}

fn describe_body(kind: EndpointKind, body: &Value) -> String {
    let number = |value: &Value, field: &str| value.get(field).and_then(Value::as_f64);

    match kind {
        EndpointKind::Route => {
            let routes = body.get("routes").and_then(Value::as_array);
            match routes.and_then(|r| r.first()) {
                Some(route) => {
                    let mut line = format!(
                        "route: {}, {}",
                        format_duration(number(route, "duration").unwrap_or(0.0)),
                        format_distance(number(route, "distance").unwrap_or(0.0))
                    );
                    let alternatives = routes.map_or(0, |r| r.len().saturating_sub(1));
                    if alternatives > 0 {
                        line.push_str(&format!(" (+{} alternatives)", alternatives));
                    }
                    line
                }
                None => "route: no route found".to_string(),
            }
        }
        EndpointKind::Nearest => {
            let waypoints = body.get("waypoints").and_then(Value::as_array);
            match waypoints.and_then(|w| w.first()) {
                Some(closest) => format!(
                    "nearest: {} candidates, closest {} away",
                    waypoints.map_or(0, Vec::len),
                    format_distance(number(closest, "distance").unwrap_or(0.0))
                ),
                None => "nearest: no candidates".to_string(),
            }
        }
        other => format!("{}: no result", other),
    }
}

/// Multi-line description of a reachability result.
pub fn describe_reachability(reachability: &Reachability) -> String {
    let mut text = format!(
        "reachability from {} ({}): {} of {} points available",
        reachability.origin,
        reachability.profile,
        reachability.available_points,
        reachability.total_points
    );
    for bucket in &reachability.buckets {
        text.push_str(&format!(
            "\n  within {}: {} points",
            format_duration(bucket.time_limit_secs as f64),
            bucket.reachable_point_count
        ));
    }
    text
}
