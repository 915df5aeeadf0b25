//! Derived figures attached to direct query responses.

use serde::Serialize;
use serde_json::Value;

use crate::query::{Query, QueryOptions};

/// Per-kind summary of an engine response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QuerySummary {
    Table {
        total_combinations: usize,
    },
    Trip {
        total_distance: f64,
        total_duration: f64,
        waypoint_count: usize,
        /// 100 minus the trip's share of one hour per waypoint, in percent
        efficiency_score: i64,
    },
    Match {
        confidence: f64,
        matched_points: usize,
        total_distance: f64,
        total_duration: f64,
    },
}

/// Summarize an engine response. Route and nearest responses have none, and
/// neither do trip or match responses without a first trip or matching.
pub fn summarize(query: &Query, body: &Value) -> Option<QuerySummary> {
    let count = query.coordinates().len();
    match query.options() {
        QueryOptions::Table(options) => Some(QuerySummary::Table {
            total_combinations: options.combinations(count),
        }),
        QueryOptions::Trip(_) => {
            let trip = body.get("trips")?.get(0)?;
            let total_duration = number(trip, "duration");
            Some(QuerySummary::Trip {
                total_distance: number(trip, "distance"),
                total_duration,
                waypoint_count: count,
                efficiency_score: efficiency_score(total_duration, count),
            })
        }
        QueryOptions::Match(_) => {
            let matching = body.get("matchings")?.get(0)?;
            Some(QuerySummary::Match {
                confidence: number(matching, "confidence"),
                matched_points: count,
                total_distance: number(matching, "distance"),
                total_duration: number(matching, "duration"),
            })
        }
        QueryOptions::Route(_) | QueryOptions::Nearest(_) => None,
    }
}

fn number(value: &Value, field: &str) -> f64 {
    value.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

/// `round((1 - duration / (waypoints * 3600)) * 100)`
fn efficiency_score(duration_secs: f64, waypoints: usize) -> i64 {
    if waypoints == 0 {
        return 0;
    }
    ((1.0 - duration_secs / (waypoints as f64 * 3600.0)) * 100.0).round() as i64
}
