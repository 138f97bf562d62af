use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Instant};

use futures::FutureExt;
use time::OffsetDateTime;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::{ActionRef, MetricsHandle, ReloadOutcome, queue::stats::Counters};

/// Single consumer of the hand-off slot.
pub(crate) struct Worker {
    pub(crate) rx: mpsc::Receiver<()>,
    pub(crate) counters: Arc<Counters>,
    pub(crate) action: ActionRef,
    pub(crate) metrics: MetricsHandle,
    /// Shutdown context forwarded to every reload.
    pub(crate) cancel: CancellationToken,
    /// Fired by `ReloadQueue::close`.
    pub(crate) closing: CancellationToken,
    /// Fired when `run` returns or unwinds.
    pub(crate) stopped: CancellationToken,
}

impl Worker {
    /// Process tokens until the queue is closed and drained.
    pub(crate) async fn run(mut self) {
        let _stopped = self.stopped.clone().drop_guard();
        let mut closed = false;
        loop {
            let token = tokio::select! {
                biased;
                token = self.rx.recv() => token,
                _ = self.closing.cancelled(), if !closed => {
                    // Refuse new tokens; a buffered one is still delivered by `recv`.
                    self.rx.close();
                    closed = true;
                    continue;
                }
            };
            match token {
                Some(()) => self.process().await,
                None => break,
            }
        }
        info!("worker stopped");
    }

    #[instrument(level = "debug", skip(self), fields(action = self.action.name()))]
    async fn process(&self) {
        // Cleared before running: requests arriving mid-reload must queue the next one.
        self.counters.clear_pending();
        debug!("worker processing reload");

        self.metrics.record_reload_started();
        let started = Instant::now();
        let result = AssertUnwindSafe(self.action.reload(self.cancel.child_token()))
            .catch_unwind()
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(result) => {
                let outcome = ReloadOutcome::of(&result);
                match result {
                    Ok(()) => {
                        self.counters.record_success(OffsetDateTime::now_utc());
                        info!(duration_ms, "reload complete");
                    }
                    Err(e) => {
                        self.counters.record_failure();
                        error!(
                            error = %e,
                            phase = e.phase().as_str(),
                            outcome = outcome.as_label(),
                            duration_ms,
                            "reload failed"
                        );
                    }
                }
                outcome
            }
            Err(panic) => {
                self.counters.record_failure();
                error!(
                    panic = panic_message(panic.as_ref()),
                    duration_ms,
                    "reload action panicked"
                );
                ReloadOutcome::Failure
            }
        };
        self.metrics.record_reload_completed(outcome, duration_ms);
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "non-string panic payload"
    }
}
