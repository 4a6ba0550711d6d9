use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Paged access to the authoritative store's instance ids for one entity
/// type. Implemented by the transactional store adapter; the queue walks it
/// page by page when a full reindex enqueues an entire type.
#[async_trait]
pub trait InstanceSource: Send + Sync {
    /// Load at most `limit` instance ids starting at `offset`. An empty page
    /// means the type is exhausted.
    async fn load_page(
        &self,
        entity_type: &str,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<String>>;
}

/// In-memory source for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryInstanceSource {
    instances: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryInstanceSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_instances(&self, entity_type: impl Into<String>, ids: Vec<String>) {
        let mut map = self.instances.lock().expect("instance source poisoned");
        map.insert(entity_type.into(), ids);
    }
}

#[async_trait]
impl InstanceSource for InMemoryInstanceSource {
    async fn load_page(
        &self,
        entity_type: &str,
        offset: usize,
        limit: usize,
    ) -> anyhow::Result<Vec<String>> {
        let map = self.instances.lock().expect("instance source poisoned");
        let Some(ids) = map.get(entity_type) else {
            return Ok(Vec::new());
        };
        if offset >= ids.len() {
            return Ok(Vec::new());
        }
        let end = (offset + limit).min(ids.len());
        Ok(ids[offset..end].to_vec())
    }
}
