//! Metrics collection abstraction for the reload worker.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected into
//! [`crate::ReloadQueue`]. The queue counters exposed through [`crate::ReloadStats`] are
//! kept independently of any backend.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle, ReloadOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

use crate::ActionError;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}

impl ReloadOutcome {
    /// Classify a reload result.
    pub fn of(result: &Result<(), ActionError>) -> Self {
        match result {
            Ok(()) => ReloadOutcome::Success,
            Err(ActionError::Timeout { .. }) => ReloadOutcome::Timeout,
            Err(ActionError::Canceled { .. }) => ReloadOutcome::Canceled,
            Err(ActionError::Failed { .. }) => ReloadOutcome::Failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;

    #[test]
    fn ok_maps_to_success() {
        assert_eq!(ReloadOutcome::of(&Ok(())), ReloadOutcome::Success);
    }

    #[test]
    fn errors_map_by_kind() {
        let failed = Err(ActionError::failed(Phase::Validate, "boom"));
        assert_eq!(ReloadOutcome::of(&failed), ReloadOutcome::Failure);

        let timeout = Err(ActionError::Timeout {
            phase: Phase::Apply,
            timeout_ms: 10,
        });
        assert_eq!(ReloadOutcome::of(&timeout), ReloadOutcome::Timeout);

        let canceled = Err(ActionError::Canceled {
            phase: Phase::Apply,
        });
        assert_eq!(ReloadOutcome::of(&canceled), ReloadOutcome::Canceled);
    }
}
