use async_trait::async_trait;
use searchsync_change_queue::ChangeQueueEntry;
use searchsync_index_meta::IndexDefinition;

/// Destroy-and-recreate of a named index with a fresh mapping.
///
/// Destructive: existing documents are lost. Callers must hold the
/// coordinator's write lock for the duration of the call.
#[async_trait]
pub trait IndexLifecycle: Send + Sync {
    async fn recreate_index(&self, definition: &IndexDefinition) -> anyhow::Result<()>;
}

/// Applies one drained change to the index: loads the current entity state
/// and upserts the document, or removes it for a delete marker.
#[async_trait]
pub trait IndexWriter: Send + Sync {
    async fn apply(&self, entry: &ChangeQueueEntry) -> anyhow::Result<()>;
}
