//! Closed option structures for each engine service.
//!
//! Every service accepts a fixed set of named options with documented
//! defaults. Options can be built directly as structs or parsed from an
//! unordered bag of `(name, value)` pairs; unknown names and out-of-domain
//! values are rejected instead of being forwarded to the engine.
//!
//! `params()` returns the effective engine parameters with defaults applied,
//! in a fixed declaration order. Two option values that produce the same
//! parameters are the same request as far as the engine is concerned.

use super::{EndpointKind, QueryError};

/// Engine query parameter: name plus already-formatted value.
pub type Param = (&'static str, String);

/// Route geometry detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overview {
    #[default]
    Full,
    Simplified,
    False,
}

impl Overview {
    fn as_str(&self) -> &'static str {
        match self {
            Overview::Full => "full",
            Overview::Simplified => "simplified",
            Overview::False => "false",
        }
    }

    fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "full" => Ok(Overview::Full),
            "simplified" => Ok(Overview::Simplified),
            "false" => Ok(Overview::False),
            _ => Err(invalid("overview", value, "full, simplified or false")),
        }
    }
}

/// Geometry encoding of returned routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Geometries {
    #[default]
    Polyline,
    Polyline6,
    GeoJson,
}

impl Geometries {
    fn as_str(&self) -> &'static str {
        match self {
            Geometries::Polyline => "polyline",
            Geometries::Polyline6 => "polyline6",
            Geometries::GeoJson => "geojson",
        }
    }

    fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "polyline" => Ok(Geometries::Polyline),
            "polyline6" => Ok(Geometries::Polyline6),
            "geojson" => Ok(Geometries::GeoJson),
            _ => Err(invalid("geometries", value, "polyline, polyline6 or geojson")),
        }
    }
}

/// A single per-segment annotation the engine can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnotationField {
    Nodes,
    Distance,
    Duration,
    Datasource,
    Weight,
    Speed,
}

impl AnnotationField {
    fn as_str(&self) -> &'static str {
        match self {
            AnnotationField::Nodes => "nodes",
            AnnotationField::Distance => "distance",
            AnnotationField::Duration => "duration",
            AnnotationField::Datasource => "datasource",
            AnnotationField::Weight => "weight",
            AnnotationField::Speed => "speed",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "nodes" => Some(AnnotationField::Nodes),
            "distance" => Some(AnnotationField::Distance),
            "duration" => Some(AnnotationField::Duration),
            "datasource" => Some(AnnotationField::Datasource),
            "weight" => Some(AnnotationField::Weight),
            "speed" => Some(AnnotationField::Speed),
            _ => None,
        }
    }
}

/// Route annotations: none, all, or a selected set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Annotations {
    #[default]
    Off,
    All,
    Only(Vec<AnnotationField>),
}

impl Annotations {
    fn to_param(&self) -> String {
        match self {
            Annotations::Off => "false".to_string(),
            Annotations::All => "true".to_string(),
            Annotations::Only(fields) => {
                // Sorted and deduplicated so field order never changes the request
                let mut fields = fields.clone();
                fields.sort();
                fields.dedup();
                fields
                    .iter()
                    .map(|f| f.as_str())
                    .collect::<Vec<_>>()
                    .join(",")
            }
        }
    }

    fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "false" => Ok(Annotations::Off),
            "true" => Ok(Annotations::All),
            list => {
                let fields = list
                    .split(',')
                    .map(|f| AnnotationField::parse(f.trim()))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| {
                        invalid(
                            "annotations",
                            value,
                            "true, false or a comma list of nodes|distance|duration|datasource|weight|speed",
                        )
                    })?;
                Ok(Annotations::Only(fields))
            }
        }
    }
}

/// Options for the `route` service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOptions {
    pub overview: Overview,
    pub geometries: Geometries,
    /// Turn-by-turn instructions (default: true)
    pub steps: bool,
    /// Alternative routes (default: false)
    pub alternatives: bool,
    pub annotations: Annotations,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            overview: Overview::Full,
            geometries: Geometries::Polyline,
            steps: true,
            alternatives: false,
            annotations: Annotations::Off,
        }
    }
}

impl RouteOptions {
    /// Minimal options for a duration-only lookup.
    pub fn duration_only() -> Self {
        Self {
            overview: Overview::False,
            steps: false,
            ..Self::default()
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "overview" => options.overview = Overview::parse(value)?,
                "geometries" => options.geometries = Geometries::parse(value)?,
                "steps" => options.steps = parse_bool(name, value)?,
                "alternatives" => options.alternatives = parse_bool(name, value)?,
                "annotations" => options.annotations = Annotations::parse(value)?,
                _ => return Err(unknown(EndpointKind::Route, name)),
            }
        }
        Ok(options)
    }

    pub fn params(&self) -> Vec<Param> {
        vec![
            ("overview", self.overview.as_str().to_string()),
            ("geometries", self.geometries.as_str().to_string()),
            ("steps", self.steps.to_string()),
            ("alternatives", self.alternatives.to_string()),
            ("annotations", self.annotations.to_param()),
        ]
    }
}

/// Which coordinates of a table query act as sources or destinations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexSelection {
    #[default]
    All,
    Only(Vec<usize>),
}

impl IndexSelection {
    fn to_param(&self) -> String {
        match self {
            IndexSelection::All => "all".to_string(),
            IndexSelection::Only(indices) => indices
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }

    fn parse(name: &str, value: &str) -> Result<Self, QueryError> {
        if value == "all" {
            return Ok(IndexSelection::All);
        }
        value
            .split(';')
            .map(|i| i.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(IndexSelection::Only)
            .map_err(|_| invalid(name, value, "'all' or ';'-separated coordinate indices"))
    }

    /// Checks that every index refers to one of `len` coordinates.
    pub(crate) fn validate(&self, name: &'static str, len: usize) -> Result<(), QueryError> {
        match self {
            IndexSelection::All => Ok(()),
            IndexSelection::Only(indices) if indices.is_empty() => Err(QueryError::EmptySelection {
                name,
            }),
            IndexSelection::Only(indices) => match indices.iter().find(|&&i| i >= len) {
                Some(&index) => Err(QueryError::IndexOutOfRange { name, index, len }),
                None => Ok(()),
            },
        }
    }
}

/// Options for the `table` service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableOptions {
    pub sources: IndexSelection,
    pub destinations: IndexSelection,
}

impl TableOptions {
    /// Builds a combined coordinate list from separate source and
    /// destination lists, with matching index selections.
    ///
    /// Sources occupy indices `0..s`, destinations `s..s+d`.
    pub fn split<C: Clone>(sources: &[C], destinations: &[C]) -> (Vec<C>, Self) {
        let mut coordinates = Vec::with_capacity(sources.len() + destinations.len());
        coordinates.extend_from_slice(sources);
        coordinates.extend_from_slice(destinations);

        let options = Self {
            sources: IndexSelection::Only((0..sources.len()).collect()),
            destinations: IndexSelection::Only(
                (sources.len()..sources.len() + destinations.len()).collect(),
            ),
        };
        (coordinates, options)
    }

    /// Number of source × destination pairs the engine will compute.
    pub fn combinations(&self, coordinate_count: usize) -> usize {
        let count = |selection: &IndexSelection| match selection {
            IndexSelection::All => coordinate_count,
            IndexSelection::Only(indices) => indices.len(),
        };
        count(&self.sources) * count(&self.destinations)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "sources" => options.sources = IndexSelection::parse(name, value)?,
                "destinations" => options.destinations = IndexSelection::parse(name, value)?,
                _ => return Err(unknown(EndpointKind::Table, name)),
            }
        }
        Ok(options)
    }

    pub fn params(&self) -> Vec<Param> {
        vec![
            ("sources", self.sources.to_param()),
            ("destinations", self.destinations.to_param()),
        ]
    }
}

/// Trip start constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripSource {
    Any,
    #[default]
    First,
}

/// Trip end constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TripDestination {
    Any,
    #[default]
    Last,
}

/// Options for the `trip` service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TripOptions {
    /// Return to the first waypoint (default: false)
    pub roundtrip: bool,
    pub source: TripSource,
    pub destination: TripDestination,
}

impl TripOptions {
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "roundtrip" => options.roundtrip = parse_bool(name, value)?,
                "source" => {
                    options.source = match value {
                        "any" => TripSource::Any,
                        "first" => TripSource::First,
                        _ => return Err(invalid(name, value, "any or first")),
                    }
                }
                "destination" => {
                    options.destination = match value {
                        "any" => TripDestination::Any,
                        "last" => TripDestination::Last,
                        _ => return Err(invalid(name, value, "any or last")),
                    }
                }
                _ => return Err(unknown(EndpointKind::Trip, name)),
            }
        }
        Ok(options)
    }

    pub fn params(&self) -> Vec<Param> {
        let source = match self.source {
            TripSource::Any => "any",
            TripSource::First => "first",
        };
        let destination = match self.destination {
            TripDestination::Any => "any",
            TripDestination::Last => "last",
        };
        vec![
            ("roundtrip", self.roundtrip.to_string()),
            ("source", source.to_string()),
            ("destination", destination.to_string()),
        ]
    }
}

/// Options for the `match` service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    /// UNIX timestamps, one per coordinate (required)
    pub timestamps: Vec<u64>,
    pub overview: Overview,
    /// Turn-by-turn instructions (default: true)
    pub steps: bool,
}

impl MatchOptions {
    pub fn new(timestamps: Vec<u64>) -> Self {
        Self {
            timestamps,
            overview: Overview::Full,
            steps: true,
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::new(Vec::new());
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "timestamps" => {
                    options.timestamps = value
                        .split(';')
                        .map(|t| t.trim().parse::<u64>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| invalid(name, value, "';'-separated UNIX timestamps"))?;
                }
                "overview" => options.overview = Overview::parse(value)?,
                "steps" => options.steps = parse_bool(name, value)?,
                _ => return Err(unknown(EndpointKind::Match, name)),
            }
        }
        Ok(options)
    }

    pub fn params(&self) -> Vec<Param> {
        let timestamps = self
            .timestamps
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(";");
        vec![
            ("timestamps", timestamps),
            ("overview", self.overview.as_str().to_string()),
            ("steps", self.steps.to_string()),
        ]
    }
}

/// Maximum number of candidates the `nearest` service may return.
pub const MAX_NEAREST_NUMBER: u8 = 10;

/// Options for the `nearest` service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NearestOptions {
    /// Number of nearest segments to return (1-10, default: 1)
    pub number: u8,
}

impl Default for NearestOptions {
    fn default() -> Self {
        Self { number: 1 }
    }
}

impl NearestOptions {
    pub fn new(number: u8) -> Result<Self, QueryError> {
        if !(1..=MAX_NEAREST_NUMBER).contains(&number) {
            return Err(invalid("number", &number.to_string(), "an integer from 1 to 10"));
        }
        Ok(Self { number })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut options = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            match name {
                "number" => {
                    let number = value
                        .trim()
                        .parse::<u8>()
                        .map_err(|_| invalid(name, value, "an integer from 1 to 10"))?;
                    options = Self::new(number)?;
                }
                _ => return Err(unknown(EndpointKind::Nearest, name)),
            }
        }
        Ok(options)
    }

    pub fn params(&self) -> Vec<Param> {
        vec![("number", self.number.to_string())]
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool, QueryError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(name, value, "true or false")),
    }
}

fn invalid(name: &str, value: &str, expected: &'static str) -> QueryError {
    QueryError::InvalidOptionValue {
        name: name.to_string(),
        value: value.to_string(),
        expected,
    }
}

fn unknown(kind: EndpointKind, name: &str) -> QueryError {
    QueryError::UnknownOption {
        kind,
        name: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_defaults() {
        let params = RouteOptions::default().params();
        assert_eq!(
            params,
            vec![
                ("overview", "full".to_string()),
                ("geometries", "polyline".to_string()),
                ("steps", "true".to_string()),
                ("alternatives", "false".to_string()),
                ("annotations", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_route_from_pairs() {
        let options =
            RouteOptions::from_pairs([("steps", "false"), ("overview", "simplified")]).unwrap();
        assert!(!options.steps);
        assert_eq!(options.overview, Overview::Simplified);
        assert_eq!(options.geometries, Geometries::Polyline);
    }

    #[test]
    fn test_route_rejects_unknown_option() {
        let err = RouteOptions::from_pairs([("exclude", "motorway")]).unwrap_err();
        assert!(matches!(err, QueryError::UnknownOption { kind: EndpointKind::Route, .. }));
    }

    #[test]
    fn test_route_rejects_bad_value() {
        let err = RouteOptions::from_pairs([("steps", "yes")]).unwrap_err();
        assert!(matches!(err, QueryError::InvalidOptionValue { .. }));
    }

    #[test]
    fn test_annotation_order_is_canonical() {
        let a = RouteOptions::from_pairs([("annotations", "speed,nodes")]).unwrap();
        let b = RouteOptions::from_pairs([("annotations", "nodes,speed,nodes")]).unwrap();
        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn test_table_split_indices() {
        let (coords, options) = TableOptions::split(&["a", "b"], &["c", "d", "e"]);
        assert_eq!(coords, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(options.sources, IndexSelection::Only(vec![0, 1]));
        assert_eq!(options.destinations, IndexSelection::Only(vec![2, 3, 4]));
        assert_eq!(options.combinations(coords.len()), 6);
        assert_eq!(
            options.params(),
            vec![
                ("sources", "0;1".to_string()),
                ("destinations", "2;3;4".to_string())
            ]
        );
    }

    #[test]
    fn test_table_all_combinations() {
        assert_eq!(TableOptions::default().combinations(4), 16);
    }

    #[test]
    fn test_index_selection_validation() {
        let selection = IndexSelection::Only(vec![0, 3]);
        assert!(selection.validate("sources", 4).is_ok());
        assert!(matches!(
            selection.validate("sources", 3),
            Err(QueryError::IndexOutOfRange { index: 3, len: 3, .. })
        ));
        assert!(matches!(
            IndexSelection::Only(vec![]).validate("sources", 3),
            Err(QueryError::EmptySelection { .. })
        ));
    }

    #[test]
    fn test_trip_defaults_match_engine_expectations() {
        let params = TripOptions::default().params();
        assert_eq!(params[0], ("roundtrip", "false".to_string()));
        assert_eq!(params[1], ("source", "first".to_string()));
        assert_eq!(params[2], ("destination", "last".to_string()));
    }

    #[test]
    fn test_match_timestamps_parse() {
        let options = MatchOptions::from_pairs([("timestamps", "1;2;3")]).unwrap();
        assert_eq!(options.timestamps, vec![1, 2, 3]);
        assert!(MatchOptions::from_pairs([("timestamps", "1;x")]).is_err());
    }

    #[test]
    fn test_nearest_number_bounds() {
        assert!(NearestOptions::new(1).is_ok());
        assert!(NearestOptions::new(10).is_ok());
        assert!(NearestOptions::new(0).is_err());
        assert!(NearestOptions::new(11).is_err());
        assert!(NearestOptions::from_pairs([("number", "12")]).is_err());
        assert_eq!(
            NearestOptions::from_pairs([("number", "3")]).unwrap().number,
            3
        );
    }
}
