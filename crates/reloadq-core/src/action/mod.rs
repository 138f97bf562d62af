//! Reload action abstraction used by the queue worker.
//!
//! The worker never knows how a reload is performed; it only drives an injected
//! [`ReloadAction`]. The production implementation lives in `reloadq-exec`,
//! tests plug in their own doubles.
mod error;
pub use error::{ActionError, Phase};

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A reload of the managed process configuration.
///
/// Implementations must:
/// - run their phases in order and stop at the first failing one;
/// - observe `cancel` and abort whatever phase is in flight when it fires;
/// - bound their own running time.
#[async_trait]
pub trait ReloadAction: Send + Sync + 'static {
    /// Action name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Perform one reload attempt.
    async fn reload(&self, cancel: CancellationToken) -> Result<(), ActionError>;
}

/// Shared handle to a reload action.
pub type ActionRef = Arc<dyn ReloadAction>;
