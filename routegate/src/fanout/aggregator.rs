//! Concurrent dispatch and settlement of reachability sub-queries.
//!
//! One single-pair route request is spawned per grid point on a `JoinSet`,
//! each tagged with its grid index and bounded by its own timeout. The job
//! waits for every sub-query to settle. A failed sub-query only marks its
//! own point unavailable; it never fails the job or its siblings.
//!
//! # Concurrency Control
//!
//! `max_in_flight` caps concurrent sub-queries per job with a semaphore
//! (0 = unbounded). An optional `job_deadline` aborts whatever is still
//! running once it elapses; those points are recorded as cancelled.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::grid::Grid;
use super::job::{FanOutError, FanOutResult, JobId, PointOutcome, ReachabilityRequest, UnavailableReason};
use super::reduce::{reduce, Reachability};
use crate::engine::{AsyncHttpClient, RoutingClient, DEFAULT_ENGINE_TIMEOUT};
use crate::query::Profile;
use crate::telemetry::GatewayMetrics;

/// Default maximum grid points per job.
pub const DEFAULT_MAX_POINTS: usize = 2500;

/// Fan-out limits.
#[derive(Debug, Clone, PartialEq)]
pub struct FanOutConfig {
    /// Jobs with more grid points are rejected before dispatch
    pub max_points: usize,
    /// Concurrent sub-queries per job, 0 for unbounded
    pub max_in_flight: usize,
    /// Timeout of each sub-query
    pub point_timeout: Duration,
    /// Deadline for the whole job, `None` to wait for every sub-query
    pub job_deadline: Option<Duration>,
}

impl Default for FanOutConfig {
    fn default() -> Self {
        Self {
            max_points: DEFAULT_MAX_POINTS,
            max_in_flight: 0,
            point_timeout: DEFAULT_ENGINE_TIMEOUT,
            job_deadline: None,
        }
    }
}

/// Answers reachability requests by fanning out route requests.
pub struct FanOutAggregator<C> {
    client: Arc<RoutingClient<C>>,
    config: FanOutConfig,
    metrics: Arc<GatewayMetrics>,
}

impl<C> FanOutAggregator<C>
where
    C: AsyncHttpClient + 'static,
{
    pub fn new(
        client: Arc<RoutingClient<C>>,
        config: FanOutConfig,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            client,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &FanOutConfig {
        &self.config
    }

    /// Validate a request against the job size limit and generate its grid.
    pub fn plan(&self, request: &ReachabilityRequest) -> Result<Grid, FanOutError> {
        let points = request.grid().point_count()?;
        if points > self.config.max_points as u64 {
            return Err(FanOutError::JobTooLarge {
                points,
                max: self.config.max_points,
            });
        }
        request.grid().generate(*request.origin())
    }

    /// Run a reachability job to completion.
    ///
    /// Only invalid parameters fail the job; sub-query failures reduce the
    /// number of available points instead.
    pub async fn run(&self, request: &ReachabilityRequest) -> Result<Reachability, FanOutError> {
        let grid = self.plan(request)?;
        let job_id = JobId::new();

        self.metrics.fanout_job_started();
        let result = self.dispatch(job_id, request.profile(), grid).await;
        self.metrics.fanout_job_completed(
            result.available_count() as u64,
            result.unavailable_count() as u64,
        );

        let buckets = reduce(&result, request.time_limits());
        info!(
            job_id = %job_id,
            points = result.points().len(),
            available = result.available_count(),
            buckets = ?buckets.iter().map(|b| b.reachable_point_count).collect::<Vec<_>>(),
            "Reachability job complete"
        );

        Ok(Reachability {
            origin: *request.origin(),
            profile: request.profile(),
            total_points: result.points().len(),
            available_points: result.available_count(),
            buckets,
        })
    }

    #[instrument(skip(self, grid), fields(job_id = %job_id, points = grid.len()))]
    async fn dispatch(&self, job_id: JobId, profile: Profile, grid: Grid) -> FanOutResult {
        let origin = grid.origin();
        let origin_index = grid.origin_index();

        let mut slots: Vec<Option<PointOutcome>> = vec![None; grid.len()];
        slots[origin_index] = Some(PointOutcome::Reached(0.0));

        let limiter = (self.config.max_in_flight > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_in_flight)));

        let mut tasks = JoinSet::new();
        for (index, &target) in grid.points().iter().enumerate() {
            if index == origin_index {
                continue;
            }
            let client = Arc::clone(&self.client);
            let limiter = limiter.clone();
            let timeout = self.config.point_timeout;

            tasks.spawn(async move {
                let _permit = match limiter {
                    Some(limiter) => limiter.acquire_owned().await.ok(),
                    None => None,
                };
                let outcome = match client.route_duration(profile, origin, target, timeout).await {
                    Ok(secs) => PointOutcome::Reached(secs),
                    Err(e) => {
                        debug!(index, target = %target, error = %e, "Sub-query failed");
                        PointOutcome::Unavailable(UnavailableReason::from(&e))
                    }
                };
                (index, outcome)
            });
        }

        // A deadline beyond the clock's range is no deadline at all
        let deadline = self
            .config
            .job_deadline
            .and_then(|d| Instant::now().checked_add(d));
        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            remaining = tasks.len(),
                            "Job deadline elapsed, cancelling remaining sub-queries"
                        );
                        tasks.abort_all();
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            match next {
                Some(Ok((index, outcome))) => slots[index] = Some(outcome),
                Some(Err(join_err)) => {
                    // Task panicked; its point stays unsettled
                    warn!(error = %join_err, "Sub-query task failed");
                }
                None => break,
            }
        }

        let result = FanOutResult::settle(grid.points().to_vec(), slots);
        if result.unavailable_count() > 0 {
            warn!(
                unavailable = result.unavailable_count(),
                total = result.points().len(),
                "Some reachability sub-queries were unavailable"
            );
        }
        result
    }
}
