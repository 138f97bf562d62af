use std::sync::Arc;

/// Reload outcome for metrics classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Both phases succeeded.
    Success,
    /// A phase failed.
    Failure,
    /// Reload aborted by shutdown.
    Canceled,
    /// Reload exceeded its time budget.
    Timeout,
}

impl ReloadOutcome {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ReloadOutcome::Success => "success",
            ReloadOutcome::Failure => "failure",
            ReloadOutcome::Canceled => "canceled",
            ReloadOutcome::Timeout => "timeout",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into [`crate::ReloadQueue`] and called from the worker
/// and from `enqueue`, so every method must be cheap and non-blocking.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record that the worker picked up a unit of work.
    fn record_reload_started(&self);
    /// Record reload completion with outcome and duration.
    ///
    /// # Arguments
    /// - `outcome`: How the reload terminated
    /// - `duration_ms`: Execution time in milliseconds
    fn record_reload_completed(&self, outcome: ReloadOutcome, duration_ms: u64);
    /// Record a request folded into an already pending reload.
    fn record_coalesced(&self);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
