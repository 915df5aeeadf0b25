//! Fan-out job types.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thiserror::Error;

use super::grid::GridSpec;
use crate::coord::Coordinate;
use crate::engine::{RoutingError, TransportError};
use crate::query::Profile;

/// Global counter for generating unique job IDs.
static JOB_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier for one fan-out job, used to correlate its log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(u64);

impl JobId {
    /// Creates a new unique job ID.
    pub fn new() -> Self {
        Self(JOB_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Invalid fan-out job parameters, raised before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FanOutError {
    #[error("Grid step must be a positive number of degrees, got {0}")]
    InvalidStep(f64),

    #[error("Grid radius must be a positive number of degrees, got {0}")]
    InvalidRadius(f64),

    #[error("Radius {radius} with step {step} produces no grid points besides the origin")]
    EmptyGrid { step: f64, radius: f64 },

    #[error("At least one time limit is required")]
    NoTimeLimits,

    #[error("Time limits must be positive, got {0}")]
    InvalidTimeLimit(u64),

    #[error("Grid of {points} points exceeds the maximum of {max} per job")]
    JobTooLarge { points: u64, max: usize },
}

/// A reachability question: which grid points around `origin` can be
/// reached within each time limit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReachabilityRequest {
    origin: Coordinate,
    time_limits: Vec<u64>,
    profile: Profile,
    grid: GridSpec,
}

impl ReachabilityRequest {
    /// Creates a request, validating time limits and grid parameters.
    ///
    /// Time limits are in seconds and keep the order given; results list one
    /// bucket per limit in the same order.
    pub fn new(
        origin: Coordinate,
        time_limits: Vec<u64>,
        profile: Profile,
        grid: GridSpec,
    ) -> Result<Self, FanOutError> {
        if time_limits.is_empty() {
            return Err(FanOutError::NoTimeLimits);
        }
        if let Some(&zero) = time_limits.iter().find(|&&limit| limit == 0) {
            return Err(FanOutError::InvalidTimeLimit(zero));
        }
        grid.steps_per_side()?;

        Ok(Self {
            origin,
            time_limits,
            profile,
            grid,
        })
    }

    pub fn origin(&self) -> &Coordinate {
        &self.origin
    }

    pub fn time_limits(&self) -> &[u64] {
        &self.time_limits
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }
}

/// Why a grid point has no duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnavailableReason {
    /// The sub-query exceeded its own timeout
    Timeout,
    /// The engine could not be reached
    Transport,
    /// The engine rejected the sub-query (e.g. no route)
    Engine,
    /// The engine answered with something that is not a route
    InvalidResponse,
    /// The job deadline elapsed before the sub-query settled
    Cancelled,
}

impl From<&RoutingError> for UnavailableReason {
    fn from(err: &RoutingError) -> Self {
        match err {
            RoutingError::Transport(TransportError::Timeout(_)) => UnavailableReason::Timeout,
            RoutingError::Transport(_) => UnavailableReason::Transport,
            RoutingError::Engine(e) if e.is_invalid_response() => {
                UnavailableReason::InvalidResponse
            }
            RoutingError::Engine(_) => UnavailableReason::Engine,
        }
    }
}

/// Settled outcome of one grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointOutcome {
    /// Travel time from the origin in seconds
    Reached(f64),
    Unavailable(UnavailableReason),
}

impl PointOutcome {
    pub fn duration(&self) -> Option<f64> {
        match self {
            PointOutcome::Reached(secs) => Some(*secs),
            PointOutcome::Unavailable(_) => None,
        }
    }
}

/// Outcome of every grid point of a job, indexed like the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutResult {
    points: Vec<Coordinate>,
    outcomes: Vec<PointOutcome>,
}

impl FanOutResult {
    /// Pairs grid points with their outcomes.
    ///
    /// Slots that never settled are recorded as cancelled.
    pub fn settle(points: Vec<Coordinate>, outcomes: Vec<Option<PointOutcome>>) -> Self {
        let outcomes = outcomes
            .into_iter()
            .map(|o| o.unwrap_or(PointOutcome::Unavailable(UnavailableReason::Cancelled)))
            .collect();
        Self { points, outcomes }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn outcomes(&self) -> &[PointOutcome] {
        &self.outcomes
    }

    /// Number of points with a duration.
    pub fn available_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.duration().is_some()).count()
    }

    pub fn unavailable_count(&self) -> usize {
        self.outcomes.len() - self.available_count()
    }

    /// Iterate `(point, duration)` for every available point, in grid order.
    pub fn durations(&self) -> impl Iterator<Item = (Coordinate, f64)> + '_ {
        self.points
            .iter()
            .zip(&self.outcomes)
            .filter_map(|(point, outcome)| outcome.duration().map(|d| (*point, d)))
    }
}
