use prometheus::{Encoder, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub transitions_total: IntCounterVec,
    pub confirm_conflicts_total: IntCounter,
    pub events_emitted_total: IntCounterVec,
    pub transition_latency_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let transitions_total = IntCounterVec::new(
            Opts::new(
                "transitions_total",
                "Order lifecycle transitions by event and outcome",
            ),
            &["event", "outcome"],
        )
        .expect("valid transitions_total metric");

        let confirm_conflicts_total = IntCounter::new(
            "confirm_conflicts_total",
            "Confirm attempts rejected because the order was no longer available",
        )
        .expect("valid confirm_conflicts_total metric");

        let events_emitted_total = IntCounterVec::new(
            Opts::new("events_emitted_total", "Realtime events emitted by name"),
            &["event"],
        )
        .expect("valid events_emitted_total metric");

        let transition_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "transition_latency_seconds",
                "Latency of lifecycle transition processing in seconds",
            ),
            &["event"],
        )
        .expect("valid transition_latency_seconds metric");

        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(confirm_conflicts_total.clone()))
            .expect("register confirm_conflicts_total");
        registry
            .register(Box::new(events_emitted_total.clone()))
            .expect("register events_emitted_total");
        registry
            .register(Box::new(transition_latency_seconds.clone()))
            .expect("register transition_latency_seconds");

        Self {
            registry,
            transitions_total,
            confirm_conflicts_total,
            events_emitted_total,
            transition_latency_seconds,
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
