use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use reloadq_core::{MetricsBackend, ReloadOutcome};

const NAMESPACE: &str = "reloadq";

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// `outcome` is bounded: "success", "failure", "canceled", "timeout".
#[derive(Clone)]
pub struct PrometheusMetrics {
    reloads_started: Counter,
    reloads_completed: CounterVec,
    reload_duration: Histogram,
    requests_coalesced: Counter,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering its metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let reloads_started = Counter::with_opts(
            Opts::new("reloads_started_total", "Total number of reloads started")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(reloads_started.clone()))?;

        let reloads_completed = CounterVec::new(
            Opts::new("reloads_completed_total", "Total number of reloads completed")
                .namespace(NAMESPACE),
            &["outcome"],
        )?;
        registry.register(Box::new(reloads_completed.clone()))?;

        let reload_duration = Histogram::with_opts(
            HistogramOpts::new("reload_duration_seconds", "Reload duration in seconds")
                .namespace(NAMESPACE)
                .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;
        registry.register(Box::new(reload_duration.clone()))?;

        let requests_coalesced = Counter::with_opts(
            Opts::new(
                "requests_coalesced_total",
                "Total number of reload requests folded into a pending reload",
            )
            .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(requests_coalesced.clone()))?;

        Ok(Self {
            reloads_started,
            reloads_completed,
            reload_duration,
            requests_coalesced,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metric families.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render the text exposition format served to scrapers.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Content type of [`render`](Self::render) output.
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_owned()
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_reload_started(&self) {
        self.reloads_started.inc();
    }

    fn record_reload_completed(&self, outcome: ReloadOutcome, duration_ms: u64) {
        self.reloads_completed
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.reload_duration.observe(duration_ms as f64 / 1000.0);
    }

    fn record_coalesced(&self) {
        self.requests_coalesced.inc();
    }
}
