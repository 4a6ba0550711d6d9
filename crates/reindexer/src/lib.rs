//! # SearchSync Reindexer
//!
//! Keeps a search index consistent with the authoritative store under
//! concurrent triggers: manual full reindexes, scheduled per-type
//! reindexes, and periodic incremental drains.
//!
//! ## Control flow
//!
//! ```text
//! Admin / scheduled trigger
//!     │
//!     ├──> reindex_entity
//!     │      ├─ initiation lock (try)     ── one full reindex at a time
//!     │      ├─ write lock (bounded wait) ── destroy + recreate index
//!     │      └─ change queue              ── repopulate in batches
//!     │
//!     └──> process_queue  (periodic tick)
//!            ├─ write lock (try)          ── never stalls a tick
//!            └─ apply drained entries     ── upsert / delete
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use searchsync_reindexer::{ReindexCoordinator, ReindexConfig};
//! # use std::sync::Arc;
//! # async fn example(
//! #     registry: Arc<searchsync_index_meta::IndexDefinitionRegistry>,
//! #     lifecycle: Arc<dyn searchsync_reindexer::IndexLifecycle>,
//! #     queue: Arc<dyn searchsync_change_queue::ChangeQueue>,
//! #     writer: Arc<dyn searchsync_reindexer::IndexWriter>,
//! # ) -> searchsync_reindexer::Result<()> {
//! let coordinator =
//!     ReindexCoordinator::new(registry, lifecycle, queue, writer, ReindexConfig::default());
//! coordinator.reindex_entity("Order").await?;
//! while coordinator.process_queue().await? > 0 {}
//! # Ok(())
//! # }
//! ```

mod backend;
mod config;
mod coordinator;
mod error;
mod failure;
mod pending;
mod scheduler;
mod security;
mod stats;

pub use backend::{IndexLifecycle, IndexWriter};
pub use config::ReindexConfig;
pub use coordinator::{
    OnContention, ReindexCoordinator, ReindexOutcome, ReindexReport, SkipReason,
};
pub use error::{ReindexerError, Result};
pub use failure::{ApplyFailurePolicy, DeadLetter, LogAndDiscard};
pub use pending::PendingReindexSet;
pub use scheduler::{DrainScheduler, SchedulerConfig};
pub use security::{ElevatedScope, SecurityContext, SystemContext};
pub use stats::CoordinatorHealth;
