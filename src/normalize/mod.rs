//! Canonical views over driver records that arrive in several shapes.
//!
//! Position is read from the first shape in [`POSITION_PRIORITY`] whose two
//! coordinates are both numbers; speed from the first source in
//! [`SPEED_PRIORITY`] that is a number. Nothing here fails: a record with no
//! usable field produces `None`.

use serde::Serialize;
use serde_json::Value;

use crate::geo::GeoPoint;
use crate::geo::speed::round_half_up;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionShape {
    /// `loc: { lat, lng }`
    Loc,
    /// `location: { latitude, longitude }`
    LocationLong,
    /// `location: { lat, lng }`
    LocationShort,
    /// `geo: { lat, lng }`
    Geo,
}

pub const POSITION_PRIORITY: [PositionShape; 4] = [
    PositionShape::Loc,
    PositionShape::LocationLong,
    PositionShape::LocationShort,
    PositionShape::Geo,
];

impl PositionShape {
    fn keys(self) -> (&'static str, &'static str, &'static str) {
        match self {
            PositionShape::Loc => ("loc", "lat", "lng"),
            PositionShape::LocationLong => ("location", "latitude", "longitude"),
            PositionShape::LocationShort => ("location", "lat", "lng"),
            PositionShape::Geo => ("geo", "lat", "lng"),
        }
    }

    pub fn extract(self, record: &Value) -> Option<GeoPoint> {
        let (field, lat_key, lng_key) = self.keys();
        let container = record.get(field)?;
        let latitude = finite_number(container.get(lat_key))?;
        let longitude = finite_number(container.get(lng_key))?;
        Some(GeoPoint {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSource {
    /// `loc.speed`
    LocSpeed,
    /// `location.speedKmh`
    LocationSpeedKmh,
    /// top-level `speed`
    Speed,
    /// top-level `avgSpeed`
    AvgSpeed,
}

pub const SPEED_PRIORITY: [SpeedSource; 4] = [
    SpeedSource::LocSpeed,
    SpeedSource::LocationSpeedKmh,
    SpeedSource::Speed,
    SpeedSource::AvgSpeed,
];

impl SpeedSource {
    pub fn extract(self, record: &Value) -> Option<f64> {
        let raw = match self {
            SpeedSource::LocSpeed => record.get("loc").and_then(|loc| loc.get("speed")),
            SpeedSource::LocationSpeedKmh => record
                .get("location")
                .and_then(|location| location.get("speedKmh")),
            SpeedSource::Speed => record.get("speed"),
            SpeedSource::AvgSpeed => record.get("avgSpeed"),
        };
        finite_number(raw)
    }
}

fn finite_number(value: Option<&Value>) -> Option<f64> {
    value
        .and_then(Value::as_f64)
        .filter(|number| number.is_finite())
}

pub fn normalize_location(record: &Value) -> Option<GeoPoint> {
    POSITION_PRIORITY
        .iter()
        .find_map(|shape| shape.extract(record))
}

/// Speed in whole km/h, rounded for display.
pub fn normalize_speed(record: &Value) -> Option<i64> {
    SPEED_PRIORITY
        .iter()
        .find_map(|source| source.extract(record))
        .map(|speed| round_half_up(speed) as i64)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverView {
    pub id: String,
    pub full_name: Option<String>,
    pub status: String,
    pub location: Option<GeoPoint>,
    pub speed_kmh: Option<i64>,
    pub heading: Option<f64>,
    pub parcels_count: Option<u64>,
}

pub fn normalize_driver(id: &str, record: &Value) -> DriverView {
    DriverView {
        id: id.to_string(),
        full_name: full_name(record),
        status: status(record),
        location: normalize_location(record),
        speed_kmh: normalize_speed(record),
        heading: finite_number(record.get("loc").and_then(|loc| loc.get("heading")))
            .or_else(|| finite_number(record.get("heading"))),
        parcels_count: parcels_count(record),
    }
}

fn non_empty_str<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn full_name(record: &Value) -> Option<String> {
    if let Some(name) =
        non_empty_str(record, "fullName").or_else(|| non_empty_str(record, "displayName"))
    {
        return Some(name.to_string());
    }

    let first = non_empty_str(record, "firstName").unwrap_or_default();
    let last = non_empty_str(record, "lastName").unwrap_or_default();
    let joined = format!("{first} {last}");
    let joined = joined.trim();
    if !joined.is_empty() {
        return Some(joined.to_string());
    }

    non_empty_str(record, "name").map(str::to_string)
}

fn status(record: &Value) -> String {
    let raw = match record.get("status").or_else(|| record.get("state")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    raw.to_lowercase()
}

fn parcels_count(record: &Value) -> Option<u64> {
    if let Some(parcels) = record.get("parcels").and_then(Value::as_array) {
        return Some(parcels.len() as u64);
    }
    record
        .get("parcelsLeft")
        .and_then(Value::as_u64)
        .or_else(|| record.get("parcelsCount").and_then(Value::as_u64))
}
