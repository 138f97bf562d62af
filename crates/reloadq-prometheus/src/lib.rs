//! Prometheus metrics backend for the reload queue.
//!
//! [`PrometheusMetrics`] implements [`reloadq_core::MetricsBackend`]; inject it with
//! [`reloadq_core::ReloadQueue::with_metrics`] and expose [`PrometheusMetrics::render`]
//! from an HTTP handler.
//!
//! ## Metrics
//! - `reloadq_reloads_started_total` - Counter
//! - `reloadq_reloads_completed_total{outcome}` - Counter
//! - `reloadq_reload_duration_seconds` - Histogram
//! - `reloadq_requests_coalesced_total` - Counter

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
