use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub eta_estimates_total: IntCounterVec,
    pub routing_fallbacks_total: IntCounterVec,
    pub eta_latency_seconds: HistogramVec,
    pub zone_checks_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let eta_estimates_total = IntCounterVec::new(
            Opts::new("eta_estimates_total", "Total ETA estimates by source"),
            &["source"],
        )
        .expect("valid eta_estimates_total metric");

        let routing_fallbacks_total = IntCounterVec::new(
            Opts::new(
                "routing_fallbacks_total",
                "Road routing failures answered by the straight-line estimator",
            ),
            &["reason"],
        )
        .expect("valid routing_fallbacks_total metric");

        let eta_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "eta_latency_seconds",
                "Latency of ETA resolution in seconds",
            ),
            &["source"],
        )
        .expect("valid eta_latency_seconds metric");

        let zone_checks_total = IntCounterVec::new(
            Opts::new("zone_checks_total", "Speed-limit lookups by outcome"),
            &["outcome"],
        )
        .expect("valid zone_checks_total metric");

        registry
            .register(Box::new(eta_estimates_total.clone()))
            .expect("register eta_estimates_total");
        registry
            .register(Box::new(routing_fallbacks_total.clone()))
            .expect("register routing_fallbacks_total");
        registry
            .register(Box::new(eta_latency_seconds.clone()))
            .expect("register eta_latency_seconds");
        registry
            .register(Box::new(zone_checks_total.clone()))
            .expect("register zone_checks_total");

        Self {
            registry,
            eta_estimates_total,
            routing_fallbacks_total,
            eta_latency_seconds,
            zone_checks_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
