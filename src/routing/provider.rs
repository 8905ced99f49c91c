use std::future::Future;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::geo::speed::round_half_up;
use crate::geo::GeoPoint;
use crate::observability::metrics::Metrics;
use crate::routing::estimator::{self, format_eta, validate_request, RouteEstimate};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoutingError {
    #[error("routing provider unavailable")]
    Unavailable,

    #[error("routing provider timed out after {0:?}")]
    Timeout(Duration),

    #[error("routing provider found no route")]
    NoRoute,

    #[error("routing provider error: {0}")]
    Provider(String),
}

impl RoutingError {
    pub fn reason(&self) -> &'static str {
        match self {
            RoutingError::Unavailable => "unavailable",
            RoutingError::Timeout(_) => "timeout",
            RoutingError::NoRoute => "no_route",
            RoutingError::Provider(_) => "provider",
        }
    }
}

/// Road-network answer for a multi-stop trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRoute {
    /// Visiting order as indices into the requested destinations.
    pub stop_indices: Vec<usize>,
    pub distance_km: f64,
    pub duration_seconds: f64,
}

/// External road-aware router (a directions API or similar).
pub trait RoutingProvider: Send + Sync {
    fn route(
        &self,
        origin: &GeoPoint,
        destinations: &[GeoPoint],
    ) -> impl Future<Output = Result<ProviderRoute, RoutingError>> + Send;
}

/// Provider used when no road router is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProvider;

impl RoutingProvider for NoProvider {
    async fn route(
        &self,
        _origin: &GeoPoint,
        _destinations: &[GeoPoint],
    ) -> Result<ProviderRoute, RoutingError> {
        Err(RoutingError::Unavailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EtaSource {
    Provider,
    StraightLine,
}

impl EtaSource {
    fn label(self) -> &'static str {
        match self {
            EtaSource::Provider => "provider",
            EtaSource::StraightLine => "straight_line",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EtaResult {
    #[serde(flatten)]
    pub estimate: RouteEstimate,
    pub source: EtaSource,
    pub eta_text: String,
}

/// Two-step ETA chain: ask the road router first, and answer with the
/// straight-line estimator whenever it errors or exceeds `timeout`.
pub struct EtaResolver<P> {
    provider: P,
    timeout: Duration,
    metrics: Metrics,
}

impl<P: RoutingProvider> EtaResolver<P> {
    pub fn new(provider: P, timeout: Duration, metrics: Metrics) -> Self {
        Self {
            provider,
            timeout,
            metrics,
        }
    }

    pub async fn resolve(
        &self,
        origin: &GeoPoint,
        destinations: &[GeoPoint],
        speed_kmh: f64,
        minutes_per_stop: f64,
    ) -> Result<EtaResult, AppError> {
        validate_request(origin, destinations, speed_kmh, minutes_per_stop)?;

        let start = Instant::now();
        let (estimate, source) = if destinations.is_empty() {
            (RouteEstimate::empty(), EtaSource::StraightLine)
        } else {
            match self.try_provider(origin, destinations, minutes_per_stop).await {
                Ok(estimate) => (estimate, EtaSource::Provider),
                Err(err) => {
                    warn!(
                        error = %err,
                        stops = destinations.len(),
                        "road routing failed; using straight-line estimate"
                    );
                    self.metrics
                        .routing_fallbacks_total
                        .with_label_values(&[err.reason()])
                        .inc();
                    (
                        estimator::estimate(origin, destinations, speed_kmh, minutes_per_stop)?,
                        EtaSource::StraightLine,
                    )
                }
            }
        };

        self.metrics
            .eta_latency_seconds
            .with_label_values(&[source.label()])
            .observe(start.elapsed().as_secs_f64());
        self.metrics
            .eta_estimates_total
            .with_label_values(&[source.label()])
            .inc();

        debug!(
            source = source.label(),
            eta_minutes = estimate.eta_minutes,
            distance_km = estimate.total_distance_km,
            "eta resolved"
        );

        Ok(EtaResult {
            eta_text: format_eta(estimate.eta_minutes),
            estimate,
            source,
        })
    }

    async fn try_provider(
        &self,
        origin: &GeoPoint,
        destinations: &[GeoPoint],
        minutes_per_stop: f64,
    ) -> Result<RouteEstimate, RoutingError> {
        let route = timeout(self.timeout, self.provider.route(origin, destinations))
            .await
            .map_err(|_| RoutingError::Timeout(self.timeout))??;

        if !is_permutation(&route.stop_indices, destinations.len()) {
            return Err(RoutingError::Provider(format!(
                "stop order {:?} does not cover {} destinations",
                route.stop_indices,
                destinations.len()
            )));
        }
        if !route.duration_seconds.is_finite() || route.duration_seconds < 0.0 {
            return Err(RoutingError::Provider(format!(
                "invalid duration {}",
                route.duration_seconds
            )));
        }

        let travel_minutes = round_half_up(route.duration_seconds / 60.0);
        let handling_minutes = minutes_per_stop * destinations.len() as f64;

        Ok(RouteEstimate {
            order: route
                .stop_indices
                .iter()
                .map(|&index| destinations[index])
                .collect(),
            stop_indices: route.stop_indices,
            total_distance_km: route.distance_km,
            eta_minutes: round_half_up(travel_minutes + handling_minutes) as i64,
        })
    }
}

fn is_permutation(indices: &[usize], len: usize) -> bool {
    if indices.len() != len {
        return false;
    }
    let mut seen = vec![false; len];
    for &index in indices {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
