mod error;
pub use error::CoreError;

mod action;
pub use action::{ActionError, ActionRef, Phase, ReloadAction};

mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, ReloadOutcome, noop_metrics};

mod queue;
pub use queue::{EnqueueOutcome, ReloadQueue, ReloadStats};
