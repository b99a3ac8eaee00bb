//! Great-circle distance and straight-line ETA estimation.
//!
//! The engine consumes externally supplied coordinates; there is no
//! map-matching or route planning here.

use crate::models::GeoPoint;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
///
/// Symmetric in its arguments; `distance_km(a, a)` is 0.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let sin_d_lat = (d_lat * 0.5).sin();
    let sin_d_lon = (d_lon * 0.5).sin();
    let h = sin_d_lat * sin_d_lat + lat1.cos() * lat2.cos() * sin_d_lon * sin_d_lon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Straight-line ETA estimate in minutes: travel time at the average speed
/// plus a fixed pickup overhead.
///
/// A non-positive speed yields `max_eta_minutes` instead of an error: ETA
/// feeds the eligibility ceiling downstream, so the fail-safe keeps a
/// degenerate speed from either crashing the scoring pass or producing an
/// artificially attractive ETA.
///
/// The returned value is not clamped; callers compare it against the
/// ceiling and clamp only for reporting.
pub fn eta_minutes(
    distance_km: f64,
    average_speed_kmh: f64,
    pickup_overhead_minutes: f64,
    max_eta_minutes: f64,
) -> f64 {
    if average_speed_kmh <= 0.0 {
        return max_eta_minutes;
    }
    distance_km / average_speed_kmh * 60.0 + pickup_overhead_minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    const PENN_STATION: GeoPoint = GeoPoint {
        latitude: 40.7128,
        longitude: -74.0060,
    };
    const TIMES_SQUARE: GeoPoint = GeoPoint {
        latitude: 40.7580,
        longitude: -73.9855,
    };

    #[test]
    fn distance_is_symmetric() {
        let forward = distance_km(PENN_STATION, TIMES_SQUARE);
        let backward = distance_km(TIMES_SQUARE, PENN_STATION);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance_km(PENN_STATION, PENN_STATION).abs() < 1e-9);
    }

    #[test]
    fn midtown_manhattan_distance() {
        let distance = distance_km(PENN_STATION, TIMES_SQUARE);
        assert!(
            distance > 4.5 && distance < 6.0,
            "expected ~5.3 km, got {distance}"
        );
    }

    #[test]
    fn eta_includes_pickup_overhead() {
        let distance = distance_km(PENN_STATION, TIMES_SQUARE);
        let eta = eta_minutes(distance, 30.0, 3.0, 30.0);
        // ~10.6 minutes of travel plus 3 minutes of pickup overhead.
        assert!(eta > 13.0 && eta < 14.5, "expected 13-14 minutes, got {eta}");
    }

    #[test]
    fn eta_grows_with_distance() {
        let near = eta_minutes(2.0, 30.0, 3.0, 30.0);
        let far = eta_minutes(20.0, 30.0, 3.0, 30.0);
        assert!(near < far);
    }

    #[test]
    fn zero_speed_falls_back_to_ceiling() {
        assert_eq!(eta_minutes(10.0, 0.0, 3.0, 30.0), 30.0);
        assert_eq!(eta_minutes(10.0, -5.0, 3.0, 30.0), 30.0);
    }

    #[test]
    fn zero_distance_is_overhead_only() {
        assert_eq!(eta_minutes(0.0, 30.0, 3.0, 30.0), 3.0);
    }
}
