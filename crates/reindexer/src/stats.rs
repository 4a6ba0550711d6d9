use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters kept by the coordinator. Relaxed ordering is enough:
/// each counter is an independent tally, not a synchronization point.
#[derive(Debug, Default)]
pub(crate) struct CoordinatorCounters {
    pub(crate) reindexes_completed: AtomicU64,
    pub(crate) reindexes_skipped: AtomicU64,
    pub(crate) write_lock_timeouts: AtomicU64,
    pub(crate) recreate_failures: AtomicU64,
    pub(crate) drain_calls: AtomicU64,
    pub(crate) entries_applied: AtomicU64,
    pub(crate) entries_dropped: AtomicU64,
}

impl CoordinatorCounters {
    pub(crate) fn snapshot(&self) -> CoordinatorHealth {
        CoordinatorHealth {
            reindexes_completed: self.reindexes_completed.load(Ordering::Relaxed),
            reindexes_skipped: self.reindexes_skipped.load(Ordering::Relaxed),
            write_lock_timeouts: self.write_lock_timeouts.load(Ordering::Relaxed),
            recreate_failures: self.recreate_failures.load(Ordering::Relaxed),
            drain_calls: self.drain_calls.load(Ordering::Relaxed),
            entries_applied: self.entries_applied.load(Ordering::Relaxed),
            entries_dropped: self.entries_dropped.load(Ordering::Relaxed),
            pending_reindex_types: 0,
            queued_entries: 0,
        }
    }
}

/// Point-in-time view of the coordinator, for health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CoordinatorHealth {
    pub reindexes_completed: u64,
    pub reindexes_skipped: u64,
    pub write_lock_timeouts: u64,
    pub recreate_failures: u64,
    pub drain_calls: u64,
    pub entries_applied: u64,
    pub entries_dropped: u64,
    pub pending_reindex_types: usize,
    pub queued_entries: usize,
}
