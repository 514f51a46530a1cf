//! Great-circle distance.

use crate::models::Coordinate;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points in kilometres, full precision.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push antipodal pairs just past 1
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Round a distance to one decimal place for display and scoring.
pub fn round_to_tenth(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_points() {
        let p = Coordinate::new(19.076, 72.8777);
        assert_eq!(distance_km(p, p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // Mumbai to Pune, roughly 120 km as the crow flies
        let mumbai = Coordinate::new(19.076, 72.8777);
        let pune = Coordinate::new(18.5204, 73.8567);
        let d = distance_km(mumbai, pune);
        assert!((d - 120.15).abs() < 0.1, "got {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = distance_km(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_KM;
        for step in 0..=2000 {
            let lat = -90.0 + 180.0 * f64::from(step) / 2000.0;
            let d = distance_km(Coordinate::new(lat, 10.0), Coordinate::new(-lat, -170.0));
            assert!(d.is_finite(), "NaN at lat {lat}");
            assert!((d - half_circumference).abs() < 1e-3, "lat {lat}: got {d}");
        }
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(1.26), 1.3);
        assert_eq!(round_to_tenth(1.24), 1.2);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = Coordinate::new(lat1, lon1);
            let b = Coordinate::new(lat2, lon2);
            let ab = distance_km(a, b);
            let ba = distance_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-9);
            prop_assert!(ab >= 0.0);
            prop_assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }
}
