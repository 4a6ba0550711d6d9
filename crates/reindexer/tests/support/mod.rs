//! Recording and gated collaborator doubles shared by the integration
//! tests.
#![allow(dead_code)]

use async_trait::async_trait;
use searchsync_change_queue::{
    ChangeQueue, ChangeQueueEntry, InMemoryChangeQueue, InMemoryInstanceSource, InstanceSource,
};
use searchsync_index_meta::{IndexDefinition, IndexDefinitionRegistry};
use searchsync_reindexer::{IndexLifecycle, IndexWriter, SecurityContext};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn definition(entity: &str) -> IndexDefinition {
    IndexDefinition::new(
        entity,
        format!("search_{}", entity.to_lowercase()),
        serde_json::json!({ "properties": {} }),
    )
}

pub fn registry_of(entities: &[&str]) -> Arc<IndexDefinitionRegistry> {
    let definitions = entities.iter().map(|e| definition(e)).collect();
    Arc::new(IndexDefinitionRegistry::from_definitions(definitions).expect("test registry"))
}

/// Tracks how many tasks sit inside a write-lock-protected section at once.
#[derive(Default)]
pub struct WriteGauge {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl WriteGauge {
    pub fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    pub fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max_seen(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// Lifecycle double that records recreated index names and can be told to
/// fail for specific indexes.
#[derive(Default)]
pub struct RecordingLifecycle {
    recreated: Mutex<Vec<String>>,
    fail_for: Mutex<HashSet<String>>,
    gauge: Option<Arc<WriteGauge>>,
}

impl RecordingLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gauge(gauge: Arc<WriteGauge>) -> Self {
        Self {
            gauge: Some(gauge),
            ..Self::default()
        }
    }

    pub fn fail_index(&self, index_name: &str) {
        self.fail_for
            .lock()
            .expect("lifecycle poisoned")
            .insert(index_name.to_string());
    }

    pub fn clear_failures(&self) {
        self.fail_for.lock().expect("lifecycle poisoned").clear();
    }

    pub fn recreated_indexes(&self) -> Vec<String> {
        self.recreated.lock().expect("lifecycle poisoned").clone()
    }
}

#[async_trait]
impl IndexLifecycle for RecordingLifecycle {
    async fn recreate_index(&self, definition: &IndexDefinition) -> anyhow::Result<()> {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        let result = if self
            .fail_for
            .lock()
            .expect("lifecycle poisoned")
            .contains(&definition.index_name)
        {
            Err(anyhow::anyhow!(
                "recreate failed for {}",
                definition.index_name
            ))
        } else {
            self.recreated
                .lock()
                .expect("lifecycle poisoned")
                .push(definition.index_name.clone());
            Ok(())
        };
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }
        result
    }
}

/// Lifecycle double that parks inside `recreate_index` until released, so a
/// test can observe the coordinator mid-recreate.
pub struct GatedLifecycle {
    pub entered: Notify,
    pub release: Notify,
    pub recreated: AtomicUsize,
}

impl GatedLifecycle {
    pub fn new() -> Self {
        Self {
            entered: Notify::new(),
            release: Notify::new(),
            recreated: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl IndexLifecycle for GatedLifecycle {
    async fn recreate_index(&self, _definition: &IndexDefinition) -> anyhow::Result<()> {
        self.recreated.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

/// Writer double that records applied entries and can be told to fail for
/// specific instance ids.
#[derive(Default)]
pub struct RecordingWriter {
    applied: Mutex<Vec<ChangeQueueEntry>>,
    fail_instances: Mutex<HashSet<String>>,
    gauge: Option<Arc<WriteGauge>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gauge(gauge: Arc<WriteGauge>) -> Self {
        Self {
            gauge: Some(gauge),
            ..Self::default()
        }
    }

    pub fn fail_instance(&self, instance_id: &str) {
        self.fail_instances
            .lock()
            .expect("writer poisoned")
            .insert(instance_id.to_string());
    }

    pub fn applied_ids(&self) -> Vec<String> {
        self.applied
            .lock()
            .expect("writer poisoned")
            .iter()
            .map(|e| e.instance_id.clone())
            .collect()
    }

    pub fn applied_count(&self) -> usize {
        self.applied.lock().expect("writer poisoned").len()
    }
}

#[async_trait]
impl IndexWriter for RecordingWriter {
    async fn apply(&self, entry: &ChangeQueueEntry) -> anyhow::Result<()> {
        if let Some(gauge) = &self.gauge {
            gauge.enter();
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let result = if self
            .fail_instances
            .lock()
            .expect("writer poisoned")
            .contains(&entry.instance_id)
        {
            Err(anyhow::anyhow!("apply failed for {}", entry.instance_id))
        } else {
            self.applied
                .lock()
                .expect("writer poisoned")
                .push(entry.clone());
            Ok(())
        };
        if let Some(gauge) = &self.gauge {
            gauge.exit();
        }
        result
    }
}

/// Writer double that parks inside `apply` until released, so a test can
/// observe a drain holding the write lock.
pub struct GatedWriter {
    pub started: Notify,
    pub release: Notify,
}

impl GatedWriter {
    pub fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl IndexWriter for GatedWriter {
    async fn apply(&self, _entry: &ChangeQueueEntry) -> anyhow::Result<()> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

/// Security context double counting begin/end pairs.
#[derive(Default)]
pub struct CountingSecurity {
    pub begun: AtomicUsize,
    pub ended: AtomicUsize,
}

impl SecurityContext for CountingSecurity {
    fn begin(&self) {
        self.begun.fetch_add(1, Ordering::SeqCst);
    }

    fn end(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

/// Queue wrapper that records the size of every drain request.
pub struct RecordingQueue {
    inner: InMemoryChangeQueue,
    drain_requests: Mutex<Vec<usize>>,
}

impl RecordingQueue {
    pub fn new(source: Arc<dyn InstanceSource>) -> Self {
        Self {
            inner: InMemoryChangeQueue::new(source),
            drain_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn drain_requests(&self) -> Vec<usize> {
        self.drain_requests
            .lock()
            .expect("recording queue poisoned")
            .clone()
    }
}

#[async_trait]
impl ChangeQueue for RecordingQueue {
    async fn publish(&self, entries: Vec<ChangeQueueEntry>) -> searchsync_change_queue::Result<()> {
        self.inner.publish(entries).await
    }

    async fn enqueue_all(
        &self,
        entity_type: &str,
        batch_size: usize,
    ) -> searchsync_change_queue::Result<u64> {
        self.inner.enqueue_all(entity_type, batch_size).await
    }

    async fn clear(&self, entity_type: &str) -> searchsync_change_queue::Result<u64> {
        self.inner.clear(entity_type).await
    }

    async fn drain(&self, max: usize) -> searchsync_change_queue::Result<Vec<ChangeQueueEntry>> {
        self.drain_requests
            .lock()
            .expect("recording queue poisoned")
            .push(max);
        self.inner.drain(max).await
    }

    async fn pending(&self) -> usize {
        self.inner.pending().await
    }
}

/// Standard wiring: one registry, an in-memory source and queue, recording
/// lifecycle and writer.
pub struct TestBed {
    pub source: Arc<InMemoryInstanceSource>,
    pub queue: Arc<InMemoryChangeQueue>,
    pub lifecycle: Arc<RecordingLifecycle>,
    pub writer: Arc<RecordingWriter>,
}

pub fn test_bed() -> TestBed {
    let source = Arc::new(InMemoryInstanceSource::new());
    let queue = Arc::new(InMemoryChangeQueue::new(source.clone()));
    TestBed {
        source,
        queue,
        lifecycle: Arc::new(RecordingLifecycle::new()),
        writer: Arc::new(RecordingWriter::new()),
    }
}
