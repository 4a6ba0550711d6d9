use log::warn;
use searchsync_change_queue::ChangeQueueEntry;
use std::sync::Mutex;

/// What to do with a queue entry that failed to apply during a drain.
///
/// The batch always continues with the next entry; the policy only decides
/// what happens to the failed one. [`LogAndDiscard`] is the default.
pub trait ApplyFailurePolicy: Send + Sync {
    fn on_failure(&self, entry: &ChangeQueueEntry, error: &anyhow::Error);
}

/// Log at warn level and drop the entry. No retry, no record.
#[derive(Debug, Default)]
pub struct LogAndDiscard;

impl ApplyFailurePolicy for LogAndDiscard {
    fn on_failure(&self, entry: &ChangeQueueEntry, error: &anyhow::Error) {
        warn!(
            "Dropping change for {}#{} after apply failure: {error}",
            entry.entity_type, entry.instance_id
        );
    }
}

/// Keeps failed entries so an operator can inspect and requeue them.
#[derive(Debug, Default)]
pub struct DeadLetter {
    entries: Mutex<Vec<ChangeQueueEntry>>,
}

impl DeadLetter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything collected so far.
    pub fn take(&self) -> Vec<ChangeQueueEntry> {
        let mut entries = self.entries.lock().expect("dead letter poisoned");
        std::mem::take(&mut *entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().expect("dead letter poisoned").len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplyFailurePolicy for DeadLetter {
    fn on_failure(&self, entry: &ChangeQueueEntry, error: &anyhow::Error) {
        warn!(
            "Recording change for {}#{} after apply failure: {error}",
            entry.entity_type, entry.instance_id
        );
        let mut entries = self.entries.lock().expect("dead letter poisoned");
        entries.push(entry.clone());
    }
}
