use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub recommendation_requests_total: IntCounterVec,
    pub recommendation_latency_seconds: HistogramVec,
    pub assignments_confirmed_total: IntCounter,
    pub active_sessions: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let recommendation_requests_total = IntCounterVec::new(
            Opts::new(
                "recommendation_requests_total",
                "Recommendation calls by outcome",
            ),
            &["outcome"],
        )
        .expect("valid recommendation_requests_total metric");

        let recommendation_latency_seconds = HistogramVec::new(
            HistogramOpts::new(
                "recommendation_latency_seconds",
                "Latency of the external recommendation call in seconds",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 40.0, 60.0]),
            &["outcome"],
        )
        .expect("valid recommendation_latency_seconds metric");

        let assignments_confirmed_total = IntCounter::new(
            "assignments_confirmed_total",
            "Confirmed truck/driver assignments",
        )
        .expect("valid assignments_confirmed_total metric");

        let active_sessions = IntGauge::new("active_sessions", "Open console sessions")
            .expect("valid active_sessions metric");

        registry
            .register(Box::new(recommendation_requests_total.clone()))
            .expect("register recommendation_requests_total");
        registry
            .register(Box::new(recommendation_latency_seconds.clone()))
            .expect("register recommendation_latency_seconds");
        registry
            .register(Box::new(assignments_confirmed_total.clone()))
            .expect("register assignments_confirmed_total");
        registry
            .register(Box::new(active_sessions.clone()))
            .expect("register active_sessions");

        Self {
            registry,
            recommendation_requests_total,
            recommendation_latency_seconds,
            assignments_confirmed_total,
            active_sessions,
        }
    }

    pub fn observe_recommendation(&self, outcome: &str, elapsed_secs: f64) {
        self.recommendation_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_secs);
        self.recommendation_requests_total
            .with_label_values(&[outcome])
            .inc();
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
