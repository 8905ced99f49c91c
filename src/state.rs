use std::sync::Arc;

use crate::config::Config;
use crate::observability::metrics::Metrics;
use crate::repository::FleetRepository;
use crate::routing::provider::{EtaResolver, RoutingProvider};

pub struct AppState<P> {
    pub repository: Arc<dyn FleetRepository>,
    pub eta: EtaResolver<P>,
    pub config: Config,
    pub metrics: Metrics,
}

impl<P: RoutingProvider> AppState<P> {
    pub fn new(config: Config, repository: Arc<dyn FleetRepository>, provider: P) -> Self {
        let metrics = Metrics::new();
        let eta = EtaResolver::new(provider, config.routing_timeout(), metrics.clone());

        Self {
            repository,
            eta,
            config,
            metrics,
        }
    }
}
