//! Coalescing reload queue.
//! - At most one unit of work waits in a capacity-1 slot.
//! - Requests arriving while one is pending are folded into it and counted.
//! - A single worker drains the slot and runs the injected [`crate::ReloadAction`].
mod stats;
pub use stats::ReloadStats;

mod worker;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::{
    sync::mpsc::{self, error::TrySendError},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{ActionRef, CoreError, MetricsHandle, noop_metrics};
use stats::Counters;
use worker::Worker;

/// Result of [`ReloadQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// A fresh unit of work was placed in the slot.
    Queued,
    /// A reload was already pending; the request is satisfied by it.
    Coalesced,
    /// The queue has been closed; nothing was scheduled.
    Closed,
}

impl EnqueueOutcome {
    /// `Queued` and `Coalesced` are both successful acceptances.
    #[inline]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, EnqueueOutcome::Closed)
    }
}

/// Queue that collapses bursts of reload requests into single reloads.
///
/// Lifecycle: [`new`](Self::new) → [`start`](Self::start) → any number of
/// [`enqueue`](Self::enqueue) / [`stats`](Self::stats) → [`close`](Self::close).
pub struct ReloadQueue {
    tx: mpsc::Sender<()>,
    rx: Mutex<Option<mpsc::Receiver<()>>>,
    counters: Arc<Counters>,
    action: ActionRef,
    metrics: MetricsHandle,
    closing: CancellationToken,
    /// Fired by the worker on exit, panics included.
    stopped: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ReloadQueue {
    /// Create a queue around the given reload action.
    pub fn new(action: ActionRef) -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            counters: Arc::new(Counters::default()),
            action,
            metrics: noop_metrics(),
            closing: CancellationToken::new(),
            stopped: CancellationToken::new(),
            worker: Mutex::new(None),
        }
    }

    /// Replace the metrics backend and return updated queue.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Launch the worker.
    ///
    /// `cancel` is the shutdown context: every reload receives a child token of it, so
    /// cancelling it aborts the reload in flight. Must be called from a tokio runtime.
    pub fn start(&self, cancel: CancellationToken) -> Result<(), CoreError> {
        let rx = self
            .rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(CoreError::AlreadyStarted)?;

        let worker = Worker {
            rx,
            counters: Arc::clone(&self.counters),
            action: Arc::clone(&self.action),
            metrics: Arc::clone(&self.metrics),
            cancel,
            closing: self.closing.clone(),
            stopped: self.stopped.clone(),
        };
        let handle = tokio::spawn(worker.run());
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        info!(action = self.action.name(), "reload worker started");
        Ok(())
    }

    /// Request a reload. Never blocks.
    pub fn enqueue(&self) -> EnqueueOutcome {
        if !self.counters.try_mark_pending() {
            self.counters.record_coalesced();
            self.metrics.record_coalesced();
            debug!("reload already pending, coalescing");
            return EnqueueOutcome::Coalesced;
        }

        match self.tx.try_send(()) {
            Ok(()) => {
                info!("reload enqueued");
                EnqueueOutcome::Queued
            }
            // Slot still occupied: the token there now stands for this request.
            Err(TrySendError::Full(())) => {
                self.counters.record_coalesced();
                self.metrics.record_coalesced();
                debug!("reload slot occupied, coalescing");
                EnqueueOutcome::Coalesced
            }
            Err(TrySendError::Closed(())) => {
                self.counters.clear_pending();
                warn!("reload requested after queue close");
                EnqueueOutcome::Closed
            }
        }
    }

    /// Close the slot and wait until the worker has drained it and exited.
    ///
    /// Every caller, concurrent or later, returns only after the drain. Closing a
    /// queue that was never started fails with [`CoreError::NotStarted`] and leaves
    /// it startable.
    pub async fn close(&self) -> Result<(), CoreError> {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            let never_started = self
                .rx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some();
            if never_started {
                return Err(CoreError::NotStarted);
            }
            // Another caller owns the join handle; wait for the same drain.
            self.closing.cancel();
            self.stopped.cancelled().await;
            return Ok(());
        };

        self.closing.cancel();
        handle
            .await
            .map_err(|e| CoreError::WorkerPanicked(e.to_string()))?;
        debug!("reload queue closed");
        Ok(())
    }

    /// Whether a reload is waiting for the worker.
    pub fn pending(&self) -> bool {
        self.counters.is_pending()
    }

    /// Snapshot of counters. Lock-free.
    pub fn stats(&self) -> ReloadStats {
        self.counters.snapshot()
    }
}
