use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::{haversine_meters, GeoPoint};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneCategory {
    Church,
    Crosswalk,
    School,
    Slowdown,
    Other(String),
}

impl From<String> for ZoneCategory {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Church" => ZoneCategory::Church,
            "Crosswalk" => ZoneCategory::Crosswalk,
            "School" => ZoneCategory::School,
            "Slowdown" => ZoneCategory::Slowdown,
            _ => ZoneCategory::Other(raw),
        }
    }
}

impl From<ZoneCategory> for String {
    fn from(category: ZoneCategory) -> Self {
        category.to_string()
    }
}

impl fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneCategory::Church => f.write_str("Church"),
            ZoneCategory::Crosswalk => f.write_str("Crosswalk"),
            ZoneCategory::School => f.write_str("School"),
            ZoneCategory::Slowdown => f.write_str("Slowdown"),
            ZoneCategory::Other(raw) => f.write_str(raw),
        }
    }
}

/// Circular speed-limit geofence. Fields are optional because zones are
/// stored by other clients; incomplete zones are skipped during evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub category: ZoneCategory,
    pub location: Option<GeoPoint>,
    #[serde(alias = "radius")]
    pub radius_meters: Option<f64>,
    #[serde(alias = "speedLimit")]
    pub speed_limit_kmh: Option<f64>,
}

impl Zone {
    pub fn validate(&self) -> Result<(), AppError> {
        let location = self.location.ok_or_else(|| {
            AppError::InvalidArgument(format!("{} zone has no location", self.category))
        })?;
        location.validate()?;

        match self.radius_meters {
            Some(radius) if radius.is_finite() => {}
            other => {
                return Err(AppError::InvalidArgument(format!(
                    "{} zone radius must be a finite number, got {other:?}",
                    self.category
                )));
            }
        }

        match self.speed_limit_kmh {
            Some(limit) if limit.is_finite() && limit > 0.0 => Ok(()),
            other => Err(AppError::InvalidArgument(format!(
                "{} zone speed limit must be positive, got {other:?}",
                self.category
            ))),
        }
    }

    fn evaluable_bounds(&self) -> Option<(GeoPoint, f64)> {
        let center = self.location?;
        let radius = self.radius_meters?;
        if !center.latitude.is_finite() || !center.longitude.is_finite() || !radius.is_finite() {
            return None;
        }
        Some((center, radius))
    }
}

/// Inclusive membership test. Zones without a usable center or radius, and
/// zones with a non-positive radius, contain no point.
pub fn is_inside(point: &GeoPoint, zone: &Zone) -> bool {
    match zone.evaluable_bounds() {
        Some((center, radius)) => radius > 0.0 && haversine_meters(point, &center) <= radius,
        None => false,
    }
}

/// Same as [`is_inside`] but rejects malformed inputs instead of treating them
/// as "outside".
pub fn check_inside(point: &GeoPoint, zone: &Zone) -> Result<bool, AppError> {
    point.validate()?;
    zone.validate()?;
    Ok(is_inside(point, zone))
}

/// Most restrictive limit among the zones containing `point` and the
/// caller-supplied fixed limits. `None` means unrestricted.
pub fn applicable_limit(point: &GeoPoint, zones: &[Zone], extra_fixed_limits: &[f64]) -> Option<f64> {
    zones
        .iter()
        .filter(|zone| is_inside(point, zone))
        .filter_map(|zone| zone.speed_limit_kmh)
        .chain(extra_fixed_limits.iter().copied())
        .filter(|limit| limit.is_finite())
        .reduce(f64::min)
}

/// `Some(limit_kmh)` when any crossing lies within `radius_m` of `point`.
pub fn crosswalk_limit(
    point: &GeoPoint,
    crossings: &[GeoPoint],
    radius_m: f64,
    limit_kmh: f64,
) -> Option<f64> {
    crossings
        .iter()
        .any(|crossing| haversine_meters(point, crossing) <= radius_m)
        .then_some(limit_kmh)
}
