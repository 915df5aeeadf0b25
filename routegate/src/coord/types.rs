//! Coordinate type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LNG: f64 = -180.0;
pub const MAX_LNG: f64 = 180.0;

/// A WGS84 position.
///
/// Immutable once constructed: the only way to obtain one is through
/// [`Coordinate::new`] (or deserialization, which goes through the same
/// validation), so every `Coordinate` in the system is known to be in range.
///
/// The engine's wire order is longitude first, and so is ours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lng: f64,
    lat: f64,
}

impl Coordinate {
    /// Creates a coordinate, validating both axes.
    pub fn new(lng: f64, lat: f64) -> Result<Self, CoordError> {
        if !lng.is_finite() || !(MIN_LNG..=MAX_LNG).contains(&lng) {
            return Err(CoordError::InvalidLongitude(lng));
        }
        if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        // Adding +0.0 folds -0.0 into 0.0 so equal positions format identically
        Ok(Self {
            lng: lng + 0.0,
            lat: lat + 0.0,
        })
    }

    /// Longitude in decimal degrees.
    #[inline]
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Latitude in decimal degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns a coordinate shifted by the given deltas, or `None` if the
    /// result would leave the valid range.
    pub fn offset(&self, d_lng: f64, d_lat: f64) -> Option<Self> {
        Self::new(self.lng + d_lng, self.lat + d_lat).ok()
    }
}

impl fmt::Display for Coordinate {
    /// Formats as the engine's `lng,lat` pair.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lng, self.lat)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = CoordError;

    /// Parses `lng,lat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lng, lat) = s
            .split_once(',')
            .ok_or_else(|| CoordError::Malformed(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        Self::new(lng, lat)
    }
}

#[derive(Deserialize)]
struct RawCoordinate {
    lng: f64,
    lat: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lng, raw.lat)
    }
}

/// Errors that can occur when constructing coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is outside valid range (-90.0 to 90.0) or not finite
    InvalidLatitude(f64),
    /// Longitude is outside valid range (-180.0 to 180.0) or not finite
    InvalidLongitude(f64),
    /// Text could not be read as a `lng,lat` pair
    Malformed(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(
                    f,
                    "Invalid latitude: {} (must be between {} and {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lng) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lng, MIN_LNG, MAX_LNG
                )
            }
            CoordError::Malformed(text) => {
                write!(f, "Malformed coordinate: '{}' (expected 'lng,lat')", text)
            }
        }
    }
}

impl std::error::Error for CoordError {}
