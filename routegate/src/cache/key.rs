//! Cache key derivation.
//!
//! A key is a pure function of a query's semantic content. The builder first
//! writes a human-readable canonical text (service tag, profile, coordinates,
//! then option parameters sorted by name) and the key is the SHA-256 of that
//! text, prefixed with the service tag:
//!
//! ```text
//! route:9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
//! ```
//!
//! Options are sorted before hashing, so the order in which they were
//! supplied never affects the key. The tag is part of the hashed text, so a
//! route and a table over the same coordinates never collide.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use sha2::{Digest, Sha256};

use crate::coord::Coordinate;
use crate::fanout::ReachabilityRequest;
use crate::query::Query;

/// Tag used for fan-out reachability results.
pub const REACHABILITY_TAG: &str = "reachability";

/// Derived cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    key: String,
    metadata: String,
}

impl CacheKey {
    /// The key text used against the cache tiers.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The canonical text the key was hashed from.
    pub fn metadata(&self) -> &str {
        &self.metadata
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Derive the cache key of a direct query.
pub fn derive_key(query: &Query) -> CacheKey {
    let mut builder = CacheKeyBuilder::new(query.kind().service());
    builder.field("profile", query.profile().as_str());
    builder.coordinates(query.coordinates());
    builder.params(
        query
            .options()
            .params()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value)),
    );
    builder.build()
}

/// Derive the cache key of a reachability request.
pub fn derive_reachability_key(request: &ReachabilityRequest) -> CacheKey {
    let grid = request.grid();
    let limits = request
        .time_limits()
        .iter()
        .map(|limit| limit.to_string())
        .collect::<Vec<_>>()
        .join(";");

    let mut builder = CacheKeyBuilder::new(REACHABILITY_TAG);
    builder.field("profile", request.profile().as_str());
    builder.coordinates(std::slice::from_ref(request.origin()));
    builder.params([
        ("radius".to_string(), format!("{:?}", grid.radius)),
        ("step".to_string(), format!("{:?}", grid.step)),
        ("time_limits".to_string(), limits),
    ]);
    builder.build()
}

/// Accumulates the canonical text of a key.
struct CacheKeyBuilder {
    tag: &'static str,
    metadata: String,
}

impl CacheKeyBuilder {
    fn new(tag: &'static str) -> Self {
        Self {
            tag,
            metadata: format!("kind: {tag}\n"),
        }
    }

    fn field(&mut self, name: &str, value: &str) {
        // Writing to a String cannot fail
        let _ = writeln!(self.metadata, "{name}: {value}");
    }

    /// Floats use `{:?}`, which round-trips exactly.
    fn coordinates(&mut self, coords: &[Coordinate]) {
        self.metadata.push_str("coordinates:");
        for c in coords {
            let _ = write!(self.metadata, " {:?},{:?}", c.lng(), c.lat());
        }
        self.metadata.push('\n');
    }

    fn params(&mut self, params: impl IntoIterator<Item = (String, String)>) {
        let sorted: BTreeMap<String, String> = params.into_iter().collect();
        for (name, value) in sorted {
            let _ = writeln!(self.metadata, "option {name}: {value}");
        }
    }

    fn build(self) -> CacheKey {
        let hash = Sha256::digest(self.metadata.as_bytes());
        let mut key = String::with_capacity(self.tag.len() + 1 + 64);
        key.push_str(self.tag);
        key.push(':');
        for b in hash.iter() {
            let _ = write!(key, "{b:02x}");
        }
        CacheKey {
            key,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::GridSpec;
    use crate::query::{
        EndpointKind, Profile, QueryOptions, RouteOptions, TableOptions, TripOptions,
    };
    use proptest::prelude::*;

    fn coord(lng: f64, lat: f64) -> Coordinate {
        Coordinate::new(lng, lat).unwrap()
    }

    fn route_from_pairs(pairs: &[(&str, &str)]) -> Query {
        let options = QueryOptions::from_pairs(EndpointKind::Route, pairs.iter().copied()).unwrap();
        Query::new(
            Profile::Driving,
            vec![coord(13.0, 52.0), coord(13.1, 52.1)],
            options,
        )
        .unwrap()
    }

    #[test]
    fn test_option_order_does_not_matter() {
        let a = route_from_pairs(&[("steps", "true"), ("overview", "full")]);
        let b = route_from_pairs(&[("overview", "full"), ("steps", "true")]);
        assert_eq!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn test_explicit_defaults_match_omitted() {
        let a = route_from_pairs(&[("steps", "true"), ("overview", "full")]);
        let b = route_from_pairs(&[]);
        assert_eq!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn test_key_format() {
        let key = derive_key(&route_from_pairs(&[]));
        let (tag, hex) = key.as_str().split_once(':').unwrap();
        assert_eq!(tag, "route");
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_kind_is_part_of_key() {
        let coords = vec![coord(13.0, 52.0), coord(13.1, 52.1)];
        let route = Query::new(
            Profile::Driving,
            coords.clone(),
            QueryOptions::Route(RouteOptions::default()),
        )
        .unwrap();
        let table = Query::new(
            Profile::Driving,
            coords.clone(),
            QueryOptions::Table(TableOptions::default()),
        )
        .unwrap();
        let trip = Query::new(
            Profile::Driving,
            coords,
            QueryOptions::Trip(TripOptions::default()),
        )
        .unwrap();

        assert_ne!(derive_key(&route), derive_key(&table));
        assert_ne!(derive_key(&route), derive_key(&trip));
        assert_ne!(derive_key(&table), derive_key(&trip));
    }

    #[test]
    fn test_profile_is_part_of_key() {
        let driving = route_from_pairs(&[]);
        let walking = driving.clone().with_profile(Profile::Walking);
        assert_ne!(derive_key(&driving), derive_key(&walking));
    }

    #[test]
    fn test_coordinate_order_matters() {
        let a = Query::route(
            vec![coord(13.0, 52.0), coord(13.1, 52.1)],
            RouteOptions::default(),
        )
        .unwrap();
        let b = Query::route(
            vec![coord(13.1, 52.1), coord(13.0, 52.0)],
            RouteOptions::default(),
        )
        .unwrap();
        assert_ne!(derive_key(&a), derive_key(&b));
    }

    #[test]
    fn test_signed_zero_coordinates_share_key() {
        let positive = Query::route(
            vec![coord(0.0, 52.0), coord(13.1, 0.0)],
            RouteOptions::default(),
        )
        .unwrap();
        let negative = Query::route(
            vec![coord(-0.0, 52.0), coord(13.1, -0.0)],
            RouteOptions::default(),
        )
        .unwrap();

        assert_eq!(positive, negative);
        assert_eq!(derive_key(&positive), derive_key(&negative));
    }

    #[test]
    fn test_metadata_is_readable() {
        let key = derive_key(&route_from_pairs(&[]));
        assert!(key.metadata().contains("kind: route"));
        assert!(key.metadata().contains("profile: driving"));
        assert!(key.metadata().contains("13.0,52.0"));
        assert!(key.metadata().contains("option steps: true"));
    }

    #[test]
    fn test_reachability_key() {
        let origin = coord(13.3886, 52.5170);
        let grid = GridSpec::new(0.05, 0.1);
        let a = ReachabilityRequest::new(origin, vec![300, 600], Profile::Driving, grid).unwrap();
        let b = ReachabilityRequest::new(origin, vec![300, 600], Profile::Driving, grid).unwrap();
        let c = ReachabilityRequest::new(origin, vec![300, 900], Profile::Driving, grid).unwrap();

        let key = derive_reachability_key(&a);
        assert!(key.as_str().starts_with("reachability:"));
        assert_eq!(key, derive_reachability_key(&b));
        assert_ne!(key, derive_reachability_key(&c));
    }

    const ROUTE_OPTION_PAIRS: [(&str, &str); 5] = [
        ("overview", "simplified"),
        ("geometries", "geojson"),
        ("steps", "false"),
        ("alternatives", "true"),
        ("annotations", "duration,distance"),
    ];

    proptest! {
        #[test]
        fn prop_key_ignores_option_order(
            order in Just((0..ROUTE_OPTION_PAIRS.len()).collect::<Vec<_>>()).prop_shuffle(),
            take in 0..=ROUTE_OPTION_PAIRS.len(),
        ) {
            let chosen: Vec<_> = order[..take].iter().map(|&i| ROUTE_OPTION_PAIRS[i]).collect();
            let mut sorted = chosen.clone();
            sorted.sort();

            prop_assert_eq!(
                derive_key(&route_from_pairs(&chosen)),
                derive_key(&route_from_pairs(&sorted))
            );
        }

        #[test]
        fn prop_different_coordinates_different_keys(
            lng1 in -180.0f64..180.0, lat1 in -90.0f64..90.0,
            lng2 in -180.0f64..180.0, lat2 in -90.0f64..90.0,
            dest_lng in -180.0f64..180.0, dest_lat in -90.0f64..90.0,
        ) {
            prop_assume!(lng1 != lng2 || lat1 != lat2);
            let dest = coord(dest_lng, dest_lat);
            let a = Query::route(vec![coord(lng1, lat1), dest], RouteOptions::default()).unwrap();
            let b = Query::route(vec![coord(lng2, lat2), dest], RouteOptions::default()).unwrap();

            prop_assert_ne!(derive_key(&a), derive_key(&b));
        }

        #[test]
        fn prop_different_nearest_number_different_keys(a in 1u8..=10, b in 1u8..=10) {
            prop_assume!(a != b);
            let origin = coord(13.0, 52.0);
            let qa = Query::nearest(origin, crate::query::NearestOptions::new(a).unwrap()).unwrap();
            let qb = Query::nearest(origin, crate::query::NearestOptions::new(b).unwrap()).unwrap();

            prop_assert_ne!(derive_key(&qa), derive_key(&qb));
        }
    }
}
