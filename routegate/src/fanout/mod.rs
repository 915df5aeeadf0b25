//! Reachability by fan-out.
//!
//! The routing engine has no notion of isochrones, so reachability is
//! assembled from many independent route requests:
//!
//! 1. [`GridSpec`] lays a square grid of target points around the origin.
//! 2. [`FanOutAggregator`] sends one route request per point, concurrently,
//!    and waits until every one has settled.
//! 3. [`reduce`] buckets the known durations by each requested time limit.
//!
//! Individual failures only remove their point from the buckets. A job fails
//! as a whole only for invalid parameters, before anything is sent.

mod aggregator;
mod grid;
mod job;
mod reduce;

pub use aggregator::{FanOutAggregator, FanOutConfig, DEFAULT_MAX_POINTS};
pub use grid::{Grid, GridSpec};
pub use job::{FanOutError, FanOutResult, JobId, PointOutcome, ReachabilityRequest, UnavailableReason};
pub use reduce::{reduce, Reachability, ReachabilityBucket};
