/// Great-circle distance helpers
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_MI: f64 = 3958.8;
pub const KM_TO_MI: f64 = 0.621371;
pub const MI_TO_KM: f64 = 1.60934;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Kilometers,
    Miles,
}

impl DistanceUnit {
    fn earth_radius(&self) -> f64 {
        match self {
            DistanceUnit::Kilometers => EARTH_RADIUS_KM,
            DistanceUnit::Miles => EARTH_RADIUS_MI,
        }
    }
}

/// Haversine distance between two `(lat, lon)` points given in degrees
pub fn haversine(from: (f64, f64), to: (f64, f64), unit: DistanceUnit) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());

    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    unit.earth_radius() * c
}

/// Distance when both sides have a location, `None` otherwise
pub fn distance_between(
    from: Option<(f64, f64)>,
    to: Option<(f64, f64)>,
    unit: DistanceUnit,
) -> Option<f64> {
    match (from, to) {
        (Some(a), Some(b)) => Some(haversine(a, b, unit)),
        _ => None,
    }
}

/// 1 at zero distance falling linearly to 0 at `max_distance`; beyond it 0
pub fn location_score(distance: f64, max_distance: f64) -> f64 {
    if max_distance <= 0.0 || distance > max_distance {
        return 0.0;
    }
    (1.0 - distance / max_distance).clamp(0.0, 1.0)
}

pub fn km_to_miles(km: f64) -> f64 {
    km * KM_TO_MI
}

pub fn miles_to_km(miles: f64) -> f64 {
    miles * MI_TO_KM
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW_YORK: (f64, f64) = (40.7128, -74.0060);
    const LOS_ANGELES: (f64, f64) = (34.0522, -118.2437);

    #[test]
    fn test_haversine_known_distance() {
        let km = haversine(NEW_YORK, LOS_ANGELES, DistanceUnit::Kilometers);
        assert!((km - 3935.7).abs() < 5.0, "got {}", km);

        let mi = haversine(NEW_YORK, LOS_ANGELES, DistanceUnit::Miles);
        assert!((mi - 2445.6).abs() < 5.0, "got {}", mi);
    }

    #[test]
    fn test_haversine_same_point_is_zero() {
        assert_eq!(haversine(NEW_YORK, NEW_YORK, DistanceUnit::Miles), 0.0);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = haversine(NEW_YORK, LOS_ANGELES, DistanceUnit::Miles);
        let b = haversine(LOS_ANGELES, NEW_YORK, DistanceUnit::Miles);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_distance_between_requires_both() {
        assert!(distance_between(Some(NEW_YORK), None, DistanceUnit::Miles).is_none());
        assert!(distance_between(None, None, DistanceUnit::Miles).is_none());
        assert!(distance_between(Some(NEW_YORK), Some(LOS_ANGELES), DistanceUnit::Miles).is_some());
    }

    #[test]
    fn test_location_score() {
        assert_eq!(location_score(0.0, 50.0), 1.0);
        assert!((location_score(25.0, 50.0) - 0.5).abs() < 1e-9);
        assert_eq!(location_score(50.0, 50.0), 0.0);
        assert_eq!(location_score(51.0, 50.0), 0.0);
        assert_eq!(location_score(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_unit_conversions() {
        assert!((km_to_miles(1.0) - 0.621371).abs() < 1e-9);
        assert!((miles_to_km(1.0) - 1.60934).abs() < 1e-9);
        assert!((km_to_miles(miles_to_km(10.0)) - 10.0).abs() < 1e-3);
    }
}
