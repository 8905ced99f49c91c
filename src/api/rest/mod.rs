pub mod drivers;
pub mod routes;
pub mod zones;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::routing::provider::RoutingProvider;
use crate::state::AppState;

pub fn router<P: RoutingProvider + 'static>(state: Arc<AppState<P>>) -> Router {
    Router::new()
        .merge(drivers::router())
        .merge(zones::router())
        .merge(routes::router())
        .route("/health", get(health::<P>))
        .route("/metrics", get(metrics::<P>))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    drivers: usize,
    zones: usize,
}

async fn health<P: RoutingProvider>(State(state): State<Arc<AppState<P>>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        drivers: state.repository.driver_count(),
        zones: state.repository.zone_count(),
    })
}

async fn metrics<P: RoutingProvider>(State(state): State<Arc<AppState<P>>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
