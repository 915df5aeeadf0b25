//! Sample grid around a reachability origin.
//!
//! Offsets are whole multiples of the step, `k * step` for `k` in `-m..=m`
//! on both axes, so the origin itself is always exactly the centre point and
//! never a rounding neighbour of it.
//!
//! ```text
//!   lat ▲   ·  ·  ·  ·  ·      m = floor(radius / step)
//!       │   ·  ·  ·  ·  ·      side = 2m + 1
//!       │   ·  ·  O  ·  ·      points = side²
//!       │   ·  ·  ·  ·  ·
//!       │   ·  ·  ·  ·  ·
//!       └──────────────────► lng
//! ```

use serde::{Deserialize, Serialize};

use super::job::FanOutError;
use crate::coord::Coordinate;

/// Slack for `radius / step` landing just under an integer (0.1 / 0.05).
const STEPS_EPSILON: f64 = 1e-9;

/// Step and radius of a sample grid, both in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub step: f64,
    pub radius: f64,
}

impl GridSpec {
    pub fn new(step: f64, radius: f64) -> Self {
        Self { step, radius }
    }

    /// Number of steps from the origin to the edge of the grid (`m`).
    pub fn steps_per_side(&self) -> Result<u64, FanOutError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(FanOutError::InvalidStep(self.step));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(FanOutError::InvalidRadius(self.radius));
        }

        let m = (self.radius / self.step + STEPS_EPSILON).floor();
        if m < 1.0 {
            return Err(FanOutError::EmptyGrid {
                step: self.step,
                radius: self.radius,
            });
        }
        // Saturates for absurd ratios; the size check rejects those anyway
        Ok(m.min(u32::MAX as f64) as u64)
    }

    /// Number of grid points before out-of-range points are dropped.
    pub fn point_count(&self) -> Result<u64, FanOutError> {
        let side = 2 * self.steps_per_side()? + 1;
        Ok(side.saturating_mul(side))
    }

    /// Generate the grid around `origin`, south to north then west to east.
    ///
    /// Points that fall outside valid coordinate ranges are dropped.
    pub fn generate(&self, origin: Coordinate) -> Result<Grid, FanOutError> {
        let m = self.steps_per_side()? as i64;
        let side = (2 * m + 1) as usize;

        let mut points = Vec::with_capacity(side * side);
        let mut origin_index = 0;
        for lat_k in -m..=m {
            for lng_k in -m..=m {
                if lat_k == 0 && lng_k == 0 {
                    origin_index = points.len();
                    points.push(origin);
                    continue;
                }
                let d_lng = lng_k as f64 * self.step;
                let d_lat = lat_k as f64 * self.step;
                if let Some(point) = origin.offset(d_lng, d_lat) {
                    points.push(point);
                }
            }
        }

        Ok(Grid {
            points,
            origin_index,
        })
    }
}

/// Generated grid of target points.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    points: Vec<Coordinate>,
    origin_index: usize,
}

impl Grid {
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Index of the origin within [`Grid::points`].
    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    pub fn origin(&self) -> Coordinate {
        self.points[self.origin_index]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
