use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::put;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::routing::provider::RoutingProvider;
use crate::state::AppState;
use crate::zones::Zone;

pub fn router<P: RoutingProvider + 'static>() -> Router<Arc<AppState<P>>> {
    Router::new().route(
        "/branches/:branch_id/zones",
        put(replace_zones::<P>).get(list_zones::<P>),
    )
}

#[derive(Deserialize, Default)]
pub struct ZoneWriteParams {
    #[serde(default)]
    pub strict: bool,
}

async fn replace_zones<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(branch_id): Path<String>,
    Query(params): Query<ZoneWriteParams>,
    Json(zones): Json<Vec<Zone>>,
) -> Result<Json<Vec<Zone>>, AppError> {
    if params.strict {
        for (index, zone) in zones.iter().enumerate() {
            zone.validate()
                .map_err(|err| AppError::InvalidArgument(format!("zone {index}: {err}")))?;
        }
    }

    info!(branch_id = %branch_id, zones = zones.len(), "zones replaced");
    state.repository.put_zones(&branch_id, zones.clone());
    Ok(Json(zones))
}

async fn list_zones<P: RoutingProvider>(
    State(state): State<Arc<AppState<P>>>,
    Path(branch_id): Path<String>,
) -> Json<Vec<Zone>> {
    Json(state.repository.zones_for_branch(&branch_id))
}
