pub mod speed;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 position in degrees. Accepts `lat`/`lng` on input so records from
/// older clients deserialize without a conversion step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AppError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()?;
        Ok(point)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(AppError::InvalidArgument(format!(
                "coordinates must be finite, got ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::InvalidArgument(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::InvalidArgument(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        Ok(())
    }
}

/// Great-circle distance in kilometres on a sphere of mean Earth radius.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    EARTH_RADIUS_KM * central_angle(lat1, lon1, lat2, lon2)
}

pub fn haversine_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    EARTH_RADIUS_M * central_angle(a.latitude, a.longitude, b.latitude, b.longitude)
}

pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lon2 - lon1).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + phi1.cos() * phi2.cos() * sin_lng * sin_lng;
    2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt())
}

/// Initial compass bearing from `a` towards `b`, in `[0, 360)`.
/// Identical points yield `0`.
pub fn bearing_degrees(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let y = delta_lng.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lng.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Maps any finite angle into `[0, 360)`. NaN and infinities come back as NaN.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = ((degrees % 360.0) + 360.0) % 360.0;
    // a tiny negative input can round up to exactly 360
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest signed turn from `from` to `to`, in `(-180, 180]`.
pub fn angular_difference(from: f64, to: f64) -> f64 {
    let diff = normalize_degrees(to - from);
    if diff > 180.0 { diff - 360.0 } else { diff }
}

/// Exponential smoothing on a circular quantity: moves `prev` by `alpha` of
/// the shortest turn towards `next`, crossing north when that is shorter.
pub fn smooth_heading(prev: f64, next: f64, alpha: f64) -> f64 {
    normalize_degrees(prev + alpha * angular_difference(prev, next))
}
