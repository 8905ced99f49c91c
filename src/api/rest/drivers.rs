use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{post, put};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::geo::speed::is_overspeeding;
use crate::geo::GeoPoint;
use crate::normalize::{normalize_driver, DriverView};
use crate::repository::{DriverRecord, FleetRepository};
use crate::routing::provider::{EtaResult, RoutingProvider};
use crate::state::AppState;
use crate::zones::{applicable_limit, crosswalk_limit, Zone, ZoneCategory};

pub fn router<P: RoutingProvider + 'static>() -> Router<Arc<AppState<P>>> {
    Router::new()
        .route("/drivers/:id", put(put_driver::<P>).get(get_driver::<P>))
        .route("/drivers/:id/speed-check", post(speed_check::<P>))
        .route("/drivers/:id/eta", post(driver_eta::<P>))
}

#[derive(Deserialize)]
pub struct SpeedCheckRequest {
    pub branch_id: String,
    /// Set when the caller already knows the driver is at a crossing.
    #[serde(default)]
    pub in_crosswalk: bool,
    /// Nearby pedestrian crossings looked up by the caller.
    #[serde(default)]
    pub crossings: Vec<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct SpeedCheckResponse {
    pub driver_id: String,
    pub location: Option<GeoPoint>,
    pub speed_kmh: Option<i64>,
    pub in_crosswalk: bool,
    pub applicable_limit_kmh: Option<f64>,
    pub overspeeding: bool,
}

#[derive(Deserialize)]
pub struct DriverEtaRequest {
    pub destinations: Vec<GeoPoint>,
    pub minutes_per_stop: Option<f64>,
}

fn find_driver(repository: &dyn FleetRepository, id: &str) -> Result<DriverRecord, AppError> {
    repository
        .driver_by_id(id)
        .ok_or_else(|| AppError::NotFound(format!("driver {id} not found")))
}

async fn put_driver<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<DriverView>, AppError> {
    if !payload.is_object() {
        return Err(AppError::BadRequest(
            "driver record must be a JSON object".to_string(),
        ));
    }

    let record = state.repository.put_driver(&id, payload);
    Ok(Json(normalize_driver(&record.id, &record.data)))
}

async fn get_driver<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> Result<Json<DriverView>, AppError> {
    let record = find_driver(state.repository.as_ref(), &id)?;
    Ok(Json(normalize_driver(&record.id, &record.data)))
}

async fn speed_check<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(payload): Json<SpeedCheckRequest>,
) -> Result<Json<SpeedCheckResponse>, AppError> {
    let record = find_driver(state.repository.as_ref(), &id)?;
    let view = normalize_driver(&record.id, &record.data);

    let Some(location) = view.location else {
        return Ok(Json(SpeedCheckResponse {
            driver_id: view.id,
            location: None,
            speed_kmh: view.speed_kmh,
            in_crosswalk: false,
            applicable_limit_kmh: None,
            overspeeding: false,
        }));
    };

    let slowdowns: Vec<Zone> = state
        .repository
        .zones_for_branch(&payload.branch_id)
        .into_iter()
        .filter(|zone| zone.category == ZoneCategory::Slowdown)
        .collect();

    let crosswalk = if payload.in_crosswalk {
        Some(state.config.crosswalk_limit_kmh)
    } else {
        crosswalk_limit(
            &location,
            &payload.crossings,
            state.config.crosswalk_radius_m,
            state.config.crosswalk_limit_kmh,
        )
    };
    let fixed_limits: Vec<f64> = crosswalk.into_iter().collect();

    let limit = applicable_limit(&location, &slowdowns, &fixed_limits);
    let overspeeding = is_overspeeding(view.speed_kmh.map(|speed| speed as f64), limit);

    let outcome = if limit.is_some() { "restricted" } else { "unrestricted" };
    state
        .metrics
        .zone_checks_total
        .with_label_values(&[outcome])
        .inc();

    if overspeeding {
        warn!(
            driver_id = %view.id,
            speed_kmh = ?view.speed_kmh,
            limit_kmh = ?limit,
            "driver over applicable speed limit"
        );
    }

    Ok(Json(SpeedCheckResponse {
        driver_id: view.id,
        location: Some(location),
        speed_kmh: view.speed_kmh,
        in_crosswalk: crosswalk.is_some(),
        applicable_limit_kmh: limit,
        overspeeding,
    }))
}

async fn driver_eta<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
    Json(payload): Json<DriverEtaRequest>,
) -> Result<Json<EtaResult>, AppError> {
    let record = find_driver(state.repository.as_ref(), &id)?;
    let view = normalize_driver(&record.id, &record.data);

    let origin = view
        .location
        .ok_or_else(|| AppError::BadRequest(format!("driver {id} has no known position")))?;

    // a parked or unknown speed would make every ETA infinite
    let speed_kmh = view
        .speed_kmh
        .filter(|speed| *speed > 0)
        .map(|speed| speed as f64)
        .unwrap_or(state.config.default_speed_kmh);
    let minutes_per_stop = payload
        .minutes_per_stop
        .unwrap_or(state.config.minutes_per_stop);

    let result = state
        .eta
        .resolve(&origin, &payload.destinations, speed_kmh, minutes_per_stop)
        .await?;

    info!(
        driver_id = %id,
        stops = payload.destinations.len(),
        eta_minutes = result.estimate.eta_minutes,
        "driver eta computed"
    );

    Ok(Json(result))
}
