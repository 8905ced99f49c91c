use serde::Serialize;

use crate::error::AppError;
use crate::geo::speed::round_half_up;
use crate::geo::{distance_km, GeoPoint};

/// Distances closer than this are treated as equal when picking the next stop.
const TIE_TOLERANCE_KM: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub order: Vec<GeoPoint>,
    /// Position of each visited stop in the caller's destination list.
    pub stop_indices: Vec<usize>,
    pub total_distance_km: f64,
    pub eta_minutes: i64,
}

impl RouteEstimate {
    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            stop_indices: Vec::new(),
            total_distance_km: 0.0,
            eta_minutes: 0,
        }
    }
}

/// Straight-line ETA for visiting every destination from `origin`.
///
/// Stops are ordered greedily: the closest unvisited destination is always
/// next, and equidistant candidates resolve to the one listed first. The
/// result is an approximation, not an optimal tour.
pub fn estimate(
    origin: &GeoPoint,
    destinations: &[GeoPoint],
    speed_kmh: f64,
    minutes_per_stop: f64,
) -> Result<RouteEstimate, AppError> {
    validate_request(origin, destinations, speed_kmh, minutes_per_stop)?;

    if destinations.is_empty() {
        return Ok(RouteEstimate::empty());
    }

    let stop_indices = nearest_neighbor_order(origin, destinations);

    let mut total_distance_km = 0.0;
    let mut current = *origin;
    let mut order = Vec::with_capacity(stop_indices.len());
    for &index in &stop_indices {
        let next = destinations[index];
        total_distance_km += distance_km(&current, &next);
        order.push(next);
        current = next;
    }

    let travel_minutes = round_half_up(total_distance_km / speed_kmh * 60.0);
    let handling_minutes = minutes_per_stop * destinations.len() as f64;
    let eta_minutes = round_half_up(travel_minutes + handling_minutes) as i64;

    Ok(RouteEstimate {
        order,
        stop_indices,
        total_distance_km,
        eta_minutes,
    })
}

pub(crate) fn validate_request(
    origin: &GeoPoint,
    destinations: &[GeoPoint],
    speed_kmh: f64,
    minutes_per_stop: f64,
) -> Result<(), AppError> {
    if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "speed must be a positive number of km/h, got {speed_kmh}"
        )));
    }
    if !minutes_per_stop.is_finite() || minutes_per_stop < 0.0 {
        return Err(AppError::InvalidArgument(format!(
            "minutes per stop must be a non-negative number, got {minutes_per_stop}"
        )));
    }
    origin.validate()?;
    for destination in destinations {
        destination.validate()?;
    }

    Ok(())
}

fn nearest_neighbor_order(origin: &GeoPoint, destinations: &[GeoPoint]) -> Vec<usize> {
    let mut visited = vec![false; destinations.len()];
    let mut order = Vec::with_capacity(destinations.len());
    let mut current = *origin;

    for _ in 0..destinations.len() {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, candidate) in destinations.iter().enumerate() {
            if visited[index] {
                continue;
            }
            let distance = distance_km(&current, candidate);
            let closer = match nearest {
                Some((_, best)) => distance < best - TIE_TOLERANCE_KM,
                None => true,
            };
            if closer {
                nearest = Some((index, distance));
            }
        }

        let Some((index, _)) = nearest else { break };
        visited[index] = true;
        order.push(index);
        current = destinations[index];
    }

    order
}

/// `"1h 5m"` when the ETA spans an hour or more, `"45m"` otherwise.
pub fn format_eta(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;
    if hours > 0 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_KM;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    /// Point on the equator `km` east of the origin.
    fn east_of_origin(km: f64) -> GeoPoint {
        point(0.0, (km / EARTH_RADIUS_KM).to_degrees())
    }

    #[test]
    fn empty_destinations_yield_zero_estimate() {
        let estimate = estimate(&point(14.6, 121.0), &[], 45.0, 5.0).unwrap();
        assert_eq!(estimate, RouteEstimate::empty());
        assert!(estimate.order.is_empty());
        assert_eq!(estimate.total_distance_km, 0.0);
        assert_eq!(estimate.eta_minutes, 0);
    }

    #[test]
    fn single_stop_adds_handling_allowance() {
        let origin = point(0.0, 0.0);
        let estimate = estimate(&origin, &[east_of_origin(45.0)], 45.0, 5.0).unwrap();

        assert!((estimate.total_distance_km - 45.0).abs() < 1e-6);
        assert_eq!(estimate.eta_minutes, 65);
    }

    #[test]
    fn visits_nearest_stop_first() {
        let origin = point(0.0, 0.0);
        let far = east_of_origin(30.0);
        let near = east_of_origin(10.0);
        let middle = east_of_origin(20.0);

        let estimate = estimate(&origin, &[far, near, middle], 60.0, 0.0).unwrap();

        assert_eq!(estimate.order, vec![near, middle, far]);
        assert_eq!(estimate.stop_indices, vec![1, 2, 0]);
        assert!((estimate.total_distance_km - 30.0).abs() < 1e-6);
        assert_eq!(estimate.eta_minutes, 30);
    }

    #[test]
    fn equidistant_stops_keep_input_order() {
        let origin = point(0.0, 0.0);
        let east = east_of_origin(10.0);
        let west = point(0.0, -east.longitude);

        let forward = estimate(&origin, &[east, west], 45.0, 5.0).unwrap();
        assert_eq!(forward.stop_indices, vec![0, 1]);

        let reversed = estimate(&origin, &[west, east], 45.0, 5.0).unwrap();
        assert_eq!(reversed.stop_indices, vec![0, 1]);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let origin = point(14.5995, 120.9842);
        let stops = [
            point(14.6760, 121.0437),
            point(14.5547, 121.0244),
            point(14.6507, 121.0494),
        ];

        let first = estimate(&origin, &stops, 30.0, 5.0).unwrap();
        let second = estimate(&origin, &stops, 30.0, 5.0).unwrap();
        assert_eq!(first.order, second.order);
        assert_eq!(first, second);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let origin = point(0.0, 0.0);
        let stops = [east_of_origin(1.0)];

        for speed in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                estimate(&origin, &stops, speed, 5.0),
                Err(AppError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let result = estimate(&point(0.0, 0.0), &[point(f64::NAN, 1.0)], 45.0, 5.0);
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_eta(0), "0m");
        assert_eq!(format_eta(45), "45m");
        assert_eq!(format_eta(65), "1h 5m");
        assert_eq!(format_eta(120), "2h 0m");
    }
}
