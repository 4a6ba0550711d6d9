use crate::entry::ChangeQueueEntry;
use crate::error::Result;
use crate::queue::{ChangeQueue, QueueState};
use crate::source::InstanceSource;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// [`ChangeQueue`] persisted as a JSON file, so pending work survives a
/// process restart.
///
/// Every mutation rewrites the file through a tmp-file + rename, keeping the
/// on-disk copy consistent even if the process dies mid-write. The lock is
/// held across the write so persisted snapshots never go backwards.
pub struct FileChangeQueue {
    path: PathBuf,
    source: Arc<dyn InstanceSource>,
    state: Mutex<QueueState>,
}

impl FileChangeQueue {
    pub async fn open(path: impl AsRef<Path>, source: Arc<dyn InstanceSource>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let bytes = tokio::fs::read(&path).await?;
            let entries: Vec<ChangeQueueEntry> = serde_json::from_slice(&bytes)?;
            QueueState::from_entries(entries)
        } else {
            QueueState::default()
        };
        Ok(Self {
            path,
            source,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, state: &QueueState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&state.to_entries())?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ChangeQueue for FileChangeQueue {
    async fn publish(&self, entries: Vec<ChangeQueueEntry>) -> Result<()> {
        let mut state = self.state.lock().await;
        for entry in entries {
            state.push(entry);
        }
        self.persist(&state).await
    }

    async fn enqueue_all(&self, entity_type: &str, batch_size: usize) -> Result<u64> {
        let limit = batch_size.max(1);
        let mut offset = 0usize;
        let mut enqueued = 0u64;
        loop {
            let page = self.source.load_page(entity_type, offset, limit).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len();
            enqueued += page.len() as u64;
            let mut state = self.state.lock().await;
            for id in page {
                state.push(ChangeQueueEntry::upsert(entity_type, id));
            }
            self.persist(&state).await?;
        }
        Ok(enqueued)
    }

    async fn clear(&self, entity_type: &str) -> Result<u64> {
        let mut state = self.state.lock().await;
        let removed = state.clear_type(entity_type);
        if removed > 0 {
            self.persist(&state).await?;
        }
        Ok(removed)
    }

    async fn drain(&self, max: usize) -> Result<Vec<ChangeQueueEntry>> {
        let mut state = self.state.lock().await;
        let drained = state.drain(max);
        if !drained.is_empty() {
            self.persist(&state).await?;
        }
        Ok(drained)
    }

    async fn pending(&self) -> usize {
        let state = self.state.lock().await;
        state.total()
    }
}
