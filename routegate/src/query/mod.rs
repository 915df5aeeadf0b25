//! Routing queries
//!
//! A [`Query`] is one request against the routing engine: a service kind
//! (route, table, trip, match, nearest), a travel profile, an ordered list of
//! coordinates and the service's closed option structure. Queries are
//! validated on construction, so anything holding a `Query` may send it.

mod options;

pub use options::{
    AnnotationField, Annotations, Geometries, IndexSelection, MatchOptions, NearestOptions,
    Overview, Param, RouteOptions, TableOptions, TripDestination, TripOptions, TripSource,
    MAX_NEAREST_NUMBER,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::{CoordError, Coordinate};

/// Engine service a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Route,
    Table,
    Trip,
    Match,
    Nearest,
}

impl EndpointKind {
    /// Service name as used in the engine's URL path.
    pub fn service(&self) -> &'static str {
        match self {
            EndpointKind::Route => "route",
            EndpointKind::Table => "table",
            EndpointKind::Trip => "trip",
            EndpointKind::Match => "match",
            EndpointKind::Nearest => "nearest",
        }
    }

    /// Minimum number of coordinates the service accepts.
    pub fn min_coordinates(&self) -> usize {
        match self {
            EndpointKind::Nearest => 1,
            _ => 2,
        }
    }

    /// Maximum number of coordinates the service accepts, if bounded.
    pub fn max_coordinates(&self) -> Option<usize> {
        match self {
            EndpointKind::Nearest => Some(1),
            _ => None,
        }
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service())
    }
}

impl FromStr for EndpointKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "route" => Ok(EndpointKind::Route),
            "table" => Ok(EndpointKind::Table),
            "trip" => Ok(EndpointKind::Trip),
            "match" => Ok(EndpointKind::Match),
            "nearest" => Ok(EndpointKind::Nearest),
            other => Err(QueryError::UnknownService(other.to_string())),
        }
    }
}

/// Travel mode passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Driving,
    Walking,
    Cycling,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Driving => "driving",
            Profile::Walking => "walking",
            Profile::Cycling => "cycling",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "driving" | "car" => Ok(Profile::Driving),
            "walking" | "foot" => Ok(Profile::Walking),
            "cycling" | "bike" => Ok(Profile::Cycling),
            _ => Err(QueryError::InvalidProfile(s.to_string())),
        }
    }
}

/// Validation errors for queries and their options.
///
/// These are surfaced to the caller immediately and are never retried or cached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{0}")]
    InvalidCoordinate(#[from] CoordError),

    #[error("{kind} requires at least {min} coordinates, got {got}")]
    TooFewCoordinates {
        kind: EndpointKind,
        min: usize,
        got: usize,
    },

    #[error("{kind} accepts at most {max} coordinates, got {got}")]
    TooManyCoordinates {
        kind: EndpointKind,
        max: usize,
        got: usize,
    },

    #[error("Unknown {kind} option: '{name}'")]
    UnknownOption { kind: EndpointKind, name: String },

    #[error("Invalid value '{value}' for option '{name}' (expected {expected})")]
    InvalidOptionValue {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("Missing required {kind} option '{name}'")]
    MissingOption {
        kind: EndpointKind,
        name: &'static str,
    },

    #[error("Option '{name}' references coordinate {index}, but only {len} were given")]
    IndexOutOfRange {
        name: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Option '{name}' selects no coordinates")]
    EmptySelection { name: &'static str },

    #[error("Coordinates and timestamps must have the same length ({coordinates} vs {timestamps})")]
    TimestampMismatch {
        coordinates: usize,
        timestamps: usize,
    },

    #[error("Unknown profile: '{0}' (expected driving, walking or cycling)")]
    InvalidProfile(String),

    #[error("Unknown service: '{0}'")]
    UnknownService(String),
}

/// Service-specific options of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOptions {
    Route(RouteOptions),
    Table(TableOptions),
    Trip(TripOptions),
    Match(MatchOptions),
    Nearest(NearestOptions),
}

impl QueryOptions {
    pub fn kind(&self) -> EndpointKind {
        match self {
            QueryOptions::Route(_) => EndpointKind::Route,
            QueryOptions::Table(_) => EndpointKind::Table,
            QueryOptions::Trip(_) => EndpointKind::Trip,
            QueryOptions::Match(_) => EndpointKind::Match,
            QueryOptions::Nearest(_) => EndpointKind::Nearest,
        }
    }

    /// Effective engine parameters, defaults applied, in declaration order.
    pub fn params(&self) -> Vec<Param> {
        match self {
            QueryOptions::Route(o) => o.params(),
            QueryOptions::Table(o) => o.params(),
            QueryOptions::Trip(o) => o.params(),
            QueryOptions::Match(o) => o.params(),
            QueryOptions::Nearest(o) => o.params(),
        }
    }

    /// Parses an unordered option bag for the given service.
    pub fn from_pairs<I, K, V>(kind: EndpointKind, pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(match kind {
            EndpointKind::Route => QueryOptions::Route(RouteOptions::from_pairs(pairs)?),
            EndpointKind::Table => QueryOptions::Table(TableOptions::from_pairs(pairs)?),
            EndpointKind::Trip => QueryOptions::Trip(TripOptions::from_pairs(pairs)?),
            EndpointKind::Match => QueryOptions::Match(MatchOptions::from_pairs(pairs)?),
            EndpointKind::Nearest => QueryOptions::Nearest(NearestOptions::from_pairs(pairs)?),
        })
    }
}

/// A validated query against the routing engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    profile: Profile,
    coordinates: Vec<Coordinate>,
    options: QueryOptions,
}

impl Query {
    /// Creates a query, validating coordinate counts and option references.
    pub fn new(
        profile: Profile,
        coordinates: Vec<Coordinate>,
        options: QueryOptions,
    ) -> Result<Self, QueryError> {
        let kind = options.kind();
        let got = coordinates.len();

        if got < kind.min_coordinates() {
            return Err(QueryError::TooFewCoordinates {
                kind,
                min: kind.min_coordinates(),
                got,
            });
        }
        if let Some(max) = kind.max_coordinates() {
            if got > max {
                return Err(QueryError::TooManyCoordinates { kind, max, got });
            }
        }

        match &options {
            QueryOptions::Table(table) => {
                table.sources.validate("sources", got)?;
                table.destinations.validate("destinations", got)?;
            }
            QueryOptions::Match(matching) => {
                if matching.timestamps.is_empty() {
                    return Err(QueryError::MissingOption {
                        kind,
                        name: "timestamps",
                    });
                }
                if matching.timestamps.len() != got {
                    return Err(QueryError::TimestampMismatch {
                        coordinates: got,
                        timestamps: matching.timestamps.len(),
                    });
                }
            }
            _ => {}
        }

        Ok(Self {
            profile,
            coordinates,
            options,
        })
    }

    /// Route through the given waypoints with the default profile.
    pub fn route(coordinates: Vec<Coordinate>, options: RouteOptions) -> Result<Self, QueryError> {
        Self::new(Profile::default(), coordinates, QueryOptions::Route(options))
    }

    /// Duration/distance matrix between separate source and destination lists.
    pub fn table(
        sources: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<Self, QueryError> {
        if sources.is_empty() {
            return Err(QueryError::EmptySelection { name: "sources" });
        }
        if destinations.is_empty() {
            return Err(QueryError::EmptySelection {
                name: "destinations",
            });
        }
        let (coordinates, options) = TableOptions::split(sources, destinations);
        Self::new(Profile::default(), coordinates, QueryOptions::Table(options))
    }

    /// Optimized round or one-way trip through the waypoints.
    pub fn trip(coordinates: Vec<Coordinate>, options: TripOptions) -> Result<Self, QueryError> {
        Self::new(Profile::default(), coordinates, QueryOptions::Trip(options))
    }

    /// Map-match a timestamped GPS trace.
    pub fn matching(
        coordinates: Vec<Coordinate>,
        options: MatchOptions,
    ) -> Result<Self, QueryError> {
        Self::new(Profile::default(), coordinates, QueryOptions::Match(options))
    }

    /// Snap a single coordinate to the nearest road segments.
    pub fn nearest(coordinate: Coordinate, options: NearestOptions) -> Result<Self, QueryError> {
        Self::new(
            Profile::default(),
            vec![coordinate],
            QueryOptions::Nearest(options),
        )
    }

    /// Replaces the travel profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn kind(&self) -> EndpointKind {
        self.options.kind()
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lng: f64, lat: f64) -> Coordinate {
        Coordinate::new(lng, lat).unwrap()
    }

    #[test]
    fn test_route_requires_two_coordinates() {
        let err = Query::route(vec![coord(13.0, 52.0)], RouteOptions::default()).unwrap_err();
        assert_eq!(
            err,
            QueryError::TooFewCoordinates {
                kind: EndpointKind::Route,
                min: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_nearest_accepts_exactly_one() {
        let ok = Query::nearest(coord(13.0, 52.0), NearestOptions::default());
        assert!(ok.is_ok());

        let err = Query::new(
            Profile::Driving,
            vec![coord(13.0, 52.0), coord(13.1, 52.1)],
            QueryOptions::Nearest(NearestOptions::default()),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::TooManyCoordinates { max: 1, .. }));
    }

    #[test]
    fn test_table_from_sources_and_destinations() {
        let query = Query::table(&[coord(13.0, 52.0)], &[coord(13.1, 52.1), coord(13.2, 52.2)])
            .unwrap();
        assert_eq!(query.kind(), EndpointKind::Table);
        assert_eq!(query.coordinates().len(), 3);
    }

    #[test]
    fn test_table_requires_sources() {
        let err = Query::table(&[], &[coord(13.1, 52.1)]).unwrap_err();
        assert_eq!(err, QueryError::EmptySelection { name: "sources" });
    }

    #[test]
    fn test_table_index_out_of_range() {
        let options = TableOptions {
            sources: IndexSelection::Only(vec![5]),
            destinations: IndexSelection::All,
        };
        let err = Query::new(
            Profile::Driving,
            vec![coord(13.0, 52.0), coord(13.1, 52.1)],
            QueryOptions::Table(options),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::IndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn test_match_requires_timestamps() {
        let coords = vec![coord(13.0, 52.0), coord(13.1, 52.1)];

        let err = Query::matching(coords.clone(), MatchOptions::new(vec![])).unwrap_err();
        assert!(matches!(err, QueryError::MissingOption { .. }));

        let err = Query::matching(coords.clone(), MatchOptions::new(vec![1])).unwrap_err();
        assert_eq!(
            err,
            QueryError::TimestampMismatch {
                coordinates: 2,
                timestamps: 1
            }
        );

        assert!(Query::matching(coords, MatchOptions::new(vec![1, 2])).is_ok());
    }

    #[test]
    fn test_profile_aliases() {
        assert_eq!("car".parse::<Profile>().unwrap(), Profile::Driving);
        assert_eq!("Foot".parse::<Profile>().unwrap(), Profile::Walking);
        assert_eq!("bike".parse::<Profile>().unwrap(), Profile::Cycling);
        assert!("hovercraft".parse::<Profile>().is_err());
    }

    #[test]
    fn test_with_profile() {
        let query = Query::route(
            vec![coord(13.0, 52.0), coord(13.1, 52.1)],
            RouteOptions::default(),
        )
        .unwrap()
        .with_profile(Profile::Cycling);
        assert_eq!(query.profile(), Profile::Cycling);
    }

    #[test]
    fn test_options_from_pairs_dispatch() {
        let options =
            QueryOptions::from_pairs(EndpointKind::Nearest, [("number", "4")]).unwrap();
        assert_eq!(options.kind(), EndpointKind::Nearest);
        assert_eq!(options.params(), vec![("number", "4".to_string())]);
    }

    #[test]
    fn test_endpoint_kind_parse() {
        assert_eq!("trip".parse::<EndpointKind>().unwrap(), EndpointKind::Trip);
        assert!("isochrone".parse::<EndpointKind>().is_err());
    }
}
