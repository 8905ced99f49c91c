use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;

use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::routing::provider::{EtaResult, RoutingProvider};
use crate::state::AppState;

pub fn router<P: RoutingProvider + 'static>() -> Router<Arc<AppState<P>>> {
    Router::new().route("/routes/estimate", post(estimate_route::<P>))
}

#[derive(Deserialize)]
pub struct EstimateRequest {
    pub origin: GeoPoint,
    pub destinations: Vec<GeoPoint>,
    pub speed_kmh: Option<f64>,
    pub minutes_per_stop: Option<f64>,
}

async fn estimate_route<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Json(payload): Json<EstimateRequest>,
) -> Result<Json<EtaResult>, AppError> {
    let speed_kmh = payload.speed_kmh.unwrap_or(state.config.default_speed_kmh);
    let minutes_per_stop = payload
        .minutes_per_stop
        .unwrap_or(state.config.minutes_per_stop);

    let result = state
        .eta
        .resolve(
            &payload.origin,
            &payload.destinations,
            speed_kmh,
            minutes_per_stop,
        )
        .await?;

    Ok(Json(result))
}
