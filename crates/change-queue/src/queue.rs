use crate::entry::ChangeQueueEntry;
use crate::error::Result;
use crate::source::InstanceSource;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Persistent FIFO of pending index changes, grouped per entity type.
///
/// Entries for one entity type are drained in the order they were enqueued;
/// across types there is no ordering guarantee. Implementations are
/// internally thread-safe, independent of any coordination locks held by
/// callers.
#[async_trait]
pub trait ChangeQueue: Send + Sync {
    /// Producer side: append entries in causal order.
    async fn publish(&self, entries: Vec<ChangeQueueEntry>) -> Result<()>;

    /// Enqueue an upsert marker for every current instance of a type,
    /// walking the instance source `batch_size` ids at a time. Returns the
    /// number of entries enqueued.
    async fn enqueue_all(&self, entity_type: &str, batch_size: usize) -> Result<u64>;

    /// Remove all pending entries for a type without applying them.
    /// Returns the number of entries removed.
    async fn clear(&self, entity_type: &str) -> Result<u64>;

    /// Remove and return up to `max` entries.
    async fn drain(&self, max: usize) -> Result<Vec<ChangeQueueEntry>>;

    /// Total queued entries across all types.
    async fn pending(&self) -> usize;
}

/// Queue contents: per-type FIFO plus the order in which types gained
/// pending entries, so drains walk types deterministically.
#[derive(Debug, Default)]
pub(crate) struct QueueState {
    by_type: HashMap<String, VecDeque<ChangeQueueEntry>>,
    type_order: Vec<String>,
}

impl QueueState {
    pub(crate) fn push(&mut self, entry: ChangeQueueEntry) {
        if !self.by_type.contains_key(&entry.entity_type) {
            self.type_order.push(entry.entity_type.clone());
        }
        self.by_type
            .entry(entry.entity_type.clone())
            .or_default()
            .push_back(entry);
    }

    pub(crate) fn clear_type(&mut self, entity_type: &str) -> u64 {
        let removed = self
            .by_type
            .remove(entity_type)
            .map_or(0, |entries| entries.len());
        self.type_order.retain(|t| t != entity_type);
        removed as u64
    }

    pub(crate) fn drain(&mut self, max: usize) -> Vec<ChangeQueueEntry> {
        let mut drained = Vec::new();
        while drained.len() < max {
            let Some(front_type) = self.type_order.first().cloned() else {
                break;
            };
            if let Some(entries) = self.by_type.get_mut(&front_type) {
                while drained.len() < max {
                    match entries.pop_front() {
                        Some(entry) => drained.push(entry),
                        None => break,
                    }
                }
                if entries.is_empty() {
                    self.by_type.remove(&front_type);
                    self.type_order.remove(0);
                }
            } else {
                self.type_order.remove(0);
            }
        }
        drained
    }

    pub(crate) fn total(&self) -> usize {
        self.by_type.values().map(VecDeque::len).sum()
    }

    /// Flatten into drain order, for persistence.
    pub(crate) fn to_entries(&self) -> Vec<ChangeQueueEntry> {
        let mut entries = Vec::with_capacity(self.total());
        for entity_type in &self.type_order {
            if let Some(queued) = self.by_type.get(entity_type) {
                entries.extend(queued.iter().cloned());
            }
        }
        entries
    }

    pub(crate) fn from_entries(entries: Vec<ChangeQueueEntry>) -> Self {
        let mut state = Self::default();
        for entry in entries {
            state.push(entry);
        }
        state
    }
}

/// In-memory [`ChangeQueue`]. The default for tests and for deployments
/// where the queue may be rebuilt from the store after a restart.
pub struct InMemoryChangeQueue {
    source: Arc<dyn InstanceSource>,
    state: Mutex<QueueState>,
}

impl InMemoryChangeQueue {
    pub fn new(source: Arc<dyn InstanceSource>) -> Self {
        Self {
            source,
            state: Mutex::new(QueueState::default()),
        }
    }
}

#[async_trait]
impl ChangeQueue for InMemoryChangeQueue {
    async fn publish(&self, entries: Vec<ChangeQueueEntry>) -> Result<()> {
        let mut state = self.state.lock().expect("change queue poisoned");
        for entry in entries {
            state.push(entry);
        }
        Ok(())
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
            let entries: Vec<ChangeQueueEntry> = page
                .into_iter()
                .map(|id| ChangeQueueEntry::upsert(entity_type, id))
                .collect();
            let mut state = self.state.lock().expect("change queue poisoned");
            for entry in entries {
                state.push(entry);
            }
        }
        Ok(enqueued)
    }

    async fn clear(&self, entity_type: &str) -> Result<u64> {
        let mut state = self.state.lock().expect("change queue poisoned");
        Ok(state.clear_type(entity_type))
    }

    async fn drain(&self, max: usize) -> Result<Vec<ChangeQueueEntry>> {
        let mut state = self.state.lock().expect("change queue poisoned");
        Ok(state.drain(max))
    }

    async fn pending(&self) -> usize {
        let state = self.state.lock().expect("change queue poisoned");
        state.total()
    }
}
