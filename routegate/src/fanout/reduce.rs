//! Reduction of settled point outcomes into time buckets.
//!
//! Every limit is checked against the same duration of a point, so a point
//! reachable within a shorter limit is reachable within every longer one.

use serde::{Deserialize, Serialize};

use super::job::FanOutResult;
use crate::coord::Coordinate;
use crate::query::Profile;

/// Points reachable within one time limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachabilityBucket {
    pub time_limit_secs: u64,
    pub reachable_point_count: usize,
    /// Reachable points in grid order
    pub points: Vec<Coordinate>,
}

/// Answer to a reachability request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reachability {
    pub origin: Coordinate,
    pub profile: Profile,
    /// One bucket per requested time limit, in request order
    pub buckets: Vec<ReachabilityBucket>,
    /// Grid points sampled, origin included
    pub total_points: usize,
    /// Grid points whose travel time is known, origin included
    pub available_points: usize,
}

/// Bucket available points by time limit.
///
/// A point is reachable within a limit iff its duration is known and no
/// greater than the limit. Unavailable points appear in no bucket.
pub fn reduce(result: &FanOutResult, time_limits: &[u64]) -> Vec<ReachabilityBucket> {
    time_limits
        .iter()
        .map(|&limit| {
            let points: Vec<Coordinate> = result
                .durations()
                .filter(|&(_, secs)| secs <= limit as f64)
                .map(|(point, _)| point)
                .collect();
            ReachabilityBucket {
                time_limit_secs: limit,
                reachable_point_count: points.len(),
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::job::{PointOutcome, UnavailableReason};
    use proptest::prelude::*;

    fn point(i: usize) -> Coordinate {
        Coordinate::new(i as f64 * 0.01, 0.0).unwrap()
    }

    fn result_from(durations: &[Option<f64>]) -> FanOutResult {
        let points = (0..durations.len()).map(point).collect();
        let outcomes = durations
            .iter()
            .map(|d| {
                Some(match d {
                    Some(secs) => PointOutcome::Reached(*secs),
                    None => PointOutcome::Unavailable(UnavailableReason::Engine),
                })
            })
            .collect();
        FanOutResult::settle(points, outcomes)
    }

    #[test]
    fn test_reduce_buckets_in_request_order() {
        let result = result_from(&[Some(0.0), Some(250.0), Some(450.0), None, Some(900.0)]);

        let buckets = reduce(&result, &[600, 300]);

        assert_eq!(buckets[0].time_limit_secs, 600);
        assert_eq!(buckets[0].reachable_point_count, 3);
        assert_eq!(buckets[1].time_limit_secs, 300);
        assert_eq!(buckets[1].points, vec![point(0), point(1)]);
    }

    #[test]
    fn test_limit_is_inclusive() {
        let result = result_from(&[Some(300.0)]);
        assert_eq!(reduce(&result, &[300])[0].reachable_point_count, 1);
    }

    #[test]
    fn test_all_unavailable_is_empty_not_error() {
        let result = result_from(&[None, None, None]);
        let buckets = reduce(&result, &[300, 600]);

        assert!(buckets.iter().all(|b| b.reachable_point_count == 0));
        assert!(buckets.iter().all(|b| b.points.is_empty()));
    }

    proptest! {
        #[test]
        fn prop_buckets_are_monotonic(
            durations in prop::collection::vec(prop::option::of(0.0f64..3600.0), 1..60),
            limits in prop::collection::vec(1u64..3600, 1..6),
        ) {
            let mut limits = limits;
            limits.sort_unstable();
            let result = result_from(&durations);
            let buckets = reduce(&result, &limits);

            for pair in buckets.windows(2) {
                let (shorter, longer) = (&pair[0], &pair[1]);
                prop_assert!(shorter.reachable_point_count <= longer.reachable_point_count);
                for p in &shorter.points {
                    prop_assert!(longer.points.contains(p));
                }
            }
        }

        #[test]
        fn prop_counts_match_points(
            durations in prop::collection::vec(prop::option::of(0.0f64..3600.0), 1..60),
            limit in 1u64..3600,
        ) {
            let result = result_from(&durations);
            let bucket = &reduce(&result, &[limit])[0];

            prop_assert_eq!(bucket.reachable_point_count, bucket.points.len());
            prop_assert!(bucket.reachable_point_count <= result.available_count());
        }
    }
}
