use crate::metrics::backend::{MetricsBackend, ReloadOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_reload_started(&self) {}

    #[inline(always)]
    fn record_reload_completed(&self, _: ReloadOutcome, _: u64) {}

    #[inline(always)]
    fn record_coalesced(&self) {}
}
