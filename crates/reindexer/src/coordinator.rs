use crate::backend::{IndexLifecycle, IndexWriter};
use crate::config::ReindexConfig;
use crate::error::{ReindexerError, Result};
use crate::failure::{ApplyFailurePolicy, LogAndDiscard};
use crate::pending::PendingReindexSet;
use crate::security::{ElevatedScope, SecurityContext, SystemContext};
use crate::stats::{CoordinatorCounters, CoordinatorHealth};
use log::{debug, error, info, warn};
use searchsync_change_queue::ChangeQueue;
use searchsync_index_meta::IndexDefinitionRegistry;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// How a reindex call reacts when another full reindex is already in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnContention {
    /// Return [`SkipReason::ReindexInProgress`] immediately. Callers that
    /// need "eventually happens" semantics should schedule instead.
    Drop,
    /// Wait up to the given duration for the in-flight reindex to finish.
    WaitUpTo(Duration),
}

/// Why a reindex call returned without touching the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ReindexInProgress,
    WriteLockTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReindexOutcome {
    /// Index recreated; `enqueued` instances queued for incremental
    /// repopulation.
    Completed { enqueued: u64 },
    Skipped { reason: SkipReason },
}

/// Tally of one [`ReindexCoordinator::reindex_all`] sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Serializes full reindexes and queue drains against one search index.
///
/// Two locks carry the discipline. The initiation lock admits at most one
/// recreate+repopulate sequence system-wide; the write lock keeps index
/// recreation and queue draining mutually exclusive. Acquire order is
/// always initiation before write, and both are RAII guards, so every exit
/// path releases in reverse order.
pub struct ReindexCoordinator {
    registry: Arc<IndexDefinitionRegistry>,
    lifecycle: Arc<dyn IndexLifecycle>,
    queue: Arc<dyn ChangeQueue>,
    writer: Arc<dyn IndexWriter>,
    security: Arc<dyn SecurityContext>,
    failure_policy: Arc<dyn ApplyFailurePolicy>,
    config: ReindexConfig,
    pending: PendingReindexSet,
    counters: CoordinatorCounters,
    initiation: Mutex<()>,
    write: Mutex<()>,
}

impl ReindexCoordinator {
    pub fn new(
        registry: Arc<IndexDefinitionRegistry>,
        lifecycle: Arc<dyn IndexLifecycle>,
        queue: Arc<dyn ChangeQueue>,
        writer: Arc<dyn IndexWriter>,
        config: ReindexConfig,
    ) -> Self {
        Self {
            registry,
            lifecycle,
            queue,
            writer,
            security: Arc::new(SystemContext),
            failure_policy: Arc::new(LogAndDiscard),
            config,
            pending: PendingReindexSet::new(),
            counters: CoordinatorCounters::default(),
            initiation: Mutex::new(()),
            write: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_security_context(mut self, security: Arc<dyn SecurityContext>) -> Self {
        self.security = security;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: Arc<dyn ApplyFailurePolicy>) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Full reindex of every registered entity type, in registration order.
    ///
    /// One entity's failure does not abort the rest; the sweep returns only
    /// after every definition has been attempted.
    pub async fn reindex_all(&self) -> ReindexReport {
        let mut report = ReindexReport::default();
        let entity_types: Vec<String> = self
            .registry
            .all()
            .iter()
            .map(|d| d.entity_type.clone())
            .collect();

        for entity_type in entity_types {
            match self.reindex_entity(&entity_type).await {
                Ok(ReindexOutcome::Completed { enqueued }) => {
                    info!("Reindex of {entity_type} queued {enqueued} instances");
                    report.completed += 1;
                }
                Ok(ReindexOutcome::Skipped { reason }) => {
                    info!("Reindex of {entity_type} skipped: {reason:?}");
                    report.skipped += 1;
                }
                Err(e) => {
                    error!("Reindex of {entity_type} failed: {e}");
                    report.failed += 1;
                }
            }
        }
        report
    }

    /// Destroy and fully repopulate one entity type's index.
    ///
    /// Drop-not-queue on contention: when another reindex is already in
    /// flight the call returns immediately having done nothing.
    pub async fn reindex_entity(&self, entity_type: &str) -> Result<ReindexOutcome> {
        self.reindex_entity_with(entity_type, OnContention::Drop)
            .await
    }

    pub async fn reindex_entity_with(
        &self,
        entity_type: &str,
        on_contention: OnContention,
    ) -> Result<ReindexOutcome> {
        let definition = self.registry.require(entity_type)?.clone();

        // Admission: at most one recreate+repopulate sequence system-wide.
        let _initiation = match on_contention {
            OnContention::Drop => match self.initiation.try_lock() {
                Ok(guard) => guard,
                Err(_) => {
                    info!("Reindex of {entity_type} skipped: another reindex is in progress");
                    self.counters.reindexes_skipped.fetch_add(1, Ordering::Relaxed);
                    return Ok(ReindexOutcome::Skipped {
                        reason: SkipReason::ReindexInProgress,
                    });
                }
            },
            OnContention::WaitUpTo(wait) => match timeout(wait, self.initiation.lock()).await {
                Ok(guard) => guard,
                Err(_) => {
                    info!(
                        "Reindex of {entity_type} skipped: another reindex still in progress after {wait:?}"
                    );
                    self.counters.reindexes_skipped.fetch_add(1, Ordering::Relaxed);
                    return Ok(ReindexOutcome::Skipped {
                        reason: SkipReason::ReindexInProgress,
                    });
                }
            },
        };

        // Give an in-flight drain time to finish before the index is
        // destroyed out from under it.
        let write = match timeout(self.config.write_lock_wait(), self.write.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                warn!(
                    "Reindex of {entity_type} abandoned: write lock not released within {:?}",
                    self.config.write_lock_wait()
                );
                self.counters.write_lock_timeouts.fetch_add(1, Ordering::Relaxed);
                return Ok(ReindexOutcome::Skipped {
                    reason: SkipReason::WriteLockTimeout,
                });
            }
        };

        let _scope = ElevatedScope::enter(self.security.as_ref());

        // Queued incremental changes are superseded by the full
        // repopulation.
        let cleared = self.queue.clear(entity_type).await?;
        if cleared > 0 {
            debug!("Discarded {cleared} queued changes for {entity_type} ahead of recreation");
        }

        if let Err(e) = self.lifecycle.recreate_index(&definition).await {
            self.counters.recreate_failures.fetch_add(1, Ordering::Relaxed);
            return Err(ReindexerError::Recreation(e));
        }

        // The write lock covers only the destructive step; repopulation
        // goes through the queue and is drained incrementally.
        drop(write);

        let enqueued = self
            .queue
            .enqueue_all(entity_type, self.config.reindex_enqueue_batch_size.max(1))
            .await?;
        info!(
            "Recreated index {} and queued {enqueued} instances of {entity_type}",
            definition.index_name
        );
        self.counters.reindexes_completed.fetch_add(1, Ordering::Relaxed);
        Ok(ReindexOutcome::Completed { enqueued })
    }

    /// Queue a full reindex of every registered type for asynchronous
    /// processing. Returns the number of newly queued types.
    pub fn schedule_reindex_all(&self) -> usize {
        let mut added = 0;
        for definition in self.registry.all() {
            if self.pending.insert(&definition.entity_type) {
                added += 1;
            }
        }
        added
    }

    /// Queue one type for asynchronous full reindex. Deduplicated: returns
    /// false when the type is already pending. Touches no locks and no
    /// index.
    pub fn schedule_reindex_entity(&self, entity_type: &str) -> Result<bool> {
        self.registry.require(entity_type)?;
        Ok(self.pending.insert(entity_type))
    }

    /// Reindex the FIFO head of the pending set, if any. One call per
    /// scheduler tick spreads a large backlog over time instead of
    /// executing it as a burst.
    pub async fn process_next_reindexing_entity(&self) -> Result<Option<(String, ReindexOutcome)>> {
        let Some(entity_type) = self.pending.pop_front() else {
            return Ok(None);
        };
        let outcome = self.reindex_entity(&entity_type).await?;
        Ok(Some((entity_type, outcome)))
    }

    /// Batch variant: works through up to `pending_reindex_batch_size`
    /// scheduled types per call.
    pub async fn process_next_reindexing_batch(&self) -> Result<Vec<(String, ReindexOutcome)>> {
        let limit = self.config.pending_reindex_batch_size.max(1);
        let mut processed = Vec::new();
        for _ in 0..limit {
            match self.process_next_reindexing_entity().await? {
                Some(item) => processed.push(item),
                None => break,
            }
        }
        Ok(processed)
    }

    /// Drain a bounded batch of queued changes into the index.
    ///
    /// Never blocks: when a reindex holds the write lock the call returns 0
    /// immediately, so scheduler ticks are never stalled. Returns the
    /// number of entries actually applied; 0 on an empty queue is the
    /// steady state between ticks, not an error.
    pub async fn process_queue(&self) -> Result<usize> {
        let Ok(_write) = self.write.try_lock() else {
            debug!("Queue drain skipped: write lock is held");
            return Ok(0);
        };

        self.counters.drain_calls.fetch_add(1, Ordering::Relaxed);
        let _scope = ElevatedScope::enter(self.security.as_ref());

        let per_iteration = self.config.process_queue_batch_size.max(1);
        // The cap bounds entries drained; an all-failing batch still
        // terminates.
        let cap = self.config.max_processed_queue_items_per_execution.max(1);

        let mut drained_total = 0usize;
        let mut applied = 0usize;

        while drained_total < cap {
            let take = per_iteration.min(cap - drained_total);
            let batch = self.queue.drain(take).await?;
            if batch.is_empty() {
                break;
            }
            drained_total += batch.len();

            for entry in &batch {
                match self.writer.apply(entry).await {
                    Ok(()) => {
                        applied += 1;
                        self.counters.entries_applied.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        self.counters.entries_dropped.fetch_add(1, Ordering::Relaxed);
                        self.failure_policy.on_failure(entry, &e);
                    }
                }
            }
        }

        if applied > 0 {
            debug!("Applied {applied} queued changes ({drained_total} drained)");
        }
        Ok(applied)
    }

    pub async fn health(&self) -> CoordinatorHealth {
        let mut health = self.counters.snapshot();
        health.pending_reindex_types = self.pending.len();
        health.queued_entries = self.queue.pending().await;
        health
    }

    /// Entity types currently awaiting an asynchronous full reindex.
    #[must_use]
    pub fn pending_reindexes(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn config(&self) -> &ReindexConfig {
        &self.config
    }
}
