//! Geographic coordinate module
//!
//! Provides the validated [`Coordinate`] value type used by every query,
//! plus great-circle distance for synthetic durations and diagnostics.

mod types;

pub use types::{Coordinate, CoordError, MAX_LAT, MAX_LNG, MIN_LAT, MIN_LNG};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates (haversine formula).
///
/// # Returns
///
/// Distance in meters.
#[inline]
pub fn haversine_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let d_phi = (b.lat() - a.lat()).to_radians();
    let d_lambda = (b.lng() - a.lng()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Joins coordinates into the engine's `lng,lat;lng,lat;...` path segment.
pub fn join_coordinates(coords: &[Coordinate]) -> String {
    coords
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let coord = Coordinate::new(13.388860, 52.517037).unwrap();
        assert_eq!(coord.lng(), 13.388860);
        assert_eq!(coord.lat(), 52.517037);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = Coordinate::new(0.0, 90.5);
        assert!(matches!(result.unwrap_err(), CoordError::InvalidLatitude(_)));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = Coordinate::new(-180.1, 0.0);
        assert!(matches!(result.unwrap_err(), CoordError::InvalidLongitude(_)));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(Coordinate::new(180.0, 90.0).is_ok());
        assert!(Coordinate::new(-180.0, -90.0).is_ok());
    }

    #[test]
    fn test_offset_out_of_range() {
        let coord = Coordinate::new(0.0, 89.95).unwrap();
        assert!(coord.offset(0.0, 0.1).is_none());
        assert!(coord.offset(0.0, -0.1).is_some());
    }

    #[test]
    fn test_parse_from_str() {
        let coord: Coordinate = "13.38886, 52.517037".parse().unwrap();
        assert_eq!(coord.lng(), 13.38886);
        assert_eq!(coord.lat(), 52.517037);

        assert!(matches!(
            "13.38886".parse::<Coordinate>(),
            Err(CoordError::Malformed(_))
        ));
        assert!(matches!(
            "500,1".parse::<Coordinate>(),
            Err(CoordError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_display_is_engine_order() {
        let coord = Coordinate::new(13.5, 52.25).unwrap();
        assert_eq!(coord.to_string(), "13.5,52.25");
    }

    #[test]
    fn test_join_coordinates() {
        let coords = vec![
            Coordinate::new(13.38886, 52.517037).unwrap(),
            Coordinate::new(13.397634, 52.529407).unwrap(),
        ];
        assert_eq!(
            join_coordinates(&coords),
            "13.38886,52.517037;13.397634,52.529407"
        );
    }

    #[test]
    fn test_negative_zero_normalized() {
        let coord: Coordinate = "-0,-0.0".parse().unwrap();
        assert!(coord.lng().is_sign_positive());
        assert!(coord.lat().is_sign_positive());
        assert_eq!(coord.to_string(), "0,0");
        assert_eq!(
            join_coordinates(&[coord, Coordinate::new(0.0, 0.0).unwrap()]),
            "0,0;0,0"
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"lng":13.0,"lat":52.0}"#).unwrap();
        assert_eq!(ok.lat(), 52.0);

        let bad = serde_json::from_str::<Coordinate>(r#"{"lng":13.0,"lat":95.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let a = Coordinate::new(13.3886, 52.5170).unwrap();
        assert_eq!(haversine_meters(&a, &a), 0.0);
    }

    #[test]
    fn test_haversine_berlin_to_potsdam() {
        // Berlin Mitte to Potsdam is roughly 26 km as the crow flies
        let berlin = Coordinate::new(13.3886, 52.5170).unwrap();
        let potsdam = Coordinate::new(13.0645, 52.3906).unwrap();
        let d = haversine_meters(&berlin, &potsdam);
        assert!((25_000.0..27_000.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coordinate::new(-74.0060, 40.7128).unwrap();
        let b = Coordinate::new(-0.1278, 51.5074).unwrap();
        let ab = haversine_meters(&a, &b);
        let ba = haversine_meters(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
    }
}
