use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lock-free queue state shared between `enqueue` callers and the worker.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pending: AtomicBool,
    reloads: AtomicU64,
    failures: AtomicU64,
    deduplicated: AtomicU64,
    /// Unix timestamp (ns) of the last successful reload, `0` while unset.
    last_reload_ns: AtomicI64,
}

impl Counters {
    /// Flip `pending` from false to true. Returns `false` if it was already set.
    #[inline]
    pub(crate) fn try_mark_pending(&self) -> bool {
        self.pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub(crate) fn clear_pending(&self) {
        self.pending.store(false, Ordering::Release);
    }

    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn record_coalesced(&self) {
        self.deduplicated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a success and stamp it.
    ///
    /// Only the worker writes the timestamp, so a plain load/store keeps it strictly increasing.
    pub(crate) fn record_success(&self, at: OffsetDateTime) {
        let now = i64::try_from(at.unix_timestamp_nanos()).unwrap_or(i64::MAX);
        let prev = self.last_reload_ns.load(Ordering::Acquire);
        let stamp = if prev != 0 && now <= prev { prev + 1 } else { now };

        self.last_reload_ns.store(stamp, Ordering::Release);
        self.reloads.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn snapshot(&self) -> ReloadStats {
        let last = self.last_reload_ns.load(Ordering::Acquire);
        ReloadStats {
            reloads: self.reloads.load(Ordering::Acquire),
            failures: self.failures.load(Ordering::Relaxed),
            deduplicated: self.deduplicated.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Acquire),
            last_reload: match last {
                0 => None,
                ns => OffsetDateTime::from_unix_timestamp_nanos(i128::from(ns)).ok(),
            },
        }
    }
}

/// Point-in-time copy of the queue counters.
///
/// Serializes to the JSON document served on `GET /metrics`; `last_reload` is omitted
/// until the first successful reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadStats {
    /// Successful reloads.
    pub reloads: u64,
    /// Failed reloads (validation, apply, timeout or shutdown).
    pub failures: u64,
    /// Requests folded into an already pending reload.
    pub deduplicated: u64,
    /// A reload is waiting for the worker.
    pub pending: bool,
    /// Time of the last successful reload.
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_reload: Option<OffsetDateTime>,
}

impl ReloadStats {
    /// Requests that reached a final state: ran to success, ran to failure, or coalesced.
    #[inline]
    pub fn accounted(&self) -> u64 {
        self.reloads + self.failures + self.deduplicated
    }
}
