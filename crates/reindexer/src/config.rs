use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Tuning knobs for the coordinator. Read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReindexConfig {
    /// Entries drained per internal iteration of `process_queue`.
    pub process_queue_batch_size: usize,
    /// Hard cap on entries drained in one `process_queue` call.
    pub max_processed_queue_items_per_execution: usize,
    /// Page size used when enqueueing a full reindex's instance set.
    pub reindex_enqueue_batch_size: usize,
    /// Scheduled full reindexes worked through per
    /// `process_next_reindexing_batch` call.
    pub pending_reindex_batch_size: usize,
    /// How long `reindex_entity` waits for an in-flight drain to release
    /// the write lock before abandoning the attempt.
    pub write_lock_wait_ms: u64,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            process_queue_batch_size: 100,
            max_processed_queue_items_per_execution: 1000,
            reindex_enqueue_batch_size: 100,
            pending_reindex_batch_size: 5,
            write_lock_wait_ms: 30_000,
        }
    }
}

impl ReindexConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    #[must_use]
    pub fn write_lock_wait(&self) -> Duration {
        Duration::from_millis(self.write_lock_wait_ms)
    }
}
