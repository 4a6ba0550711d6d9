//! # SearchSync Change Queue
//!
//! Persistent FIFO of "entity instance needs (re)indexing" markers, grouped
//! per entity type. Producers are data-change listeners and the full-reindex
//! repopulation path; the consumer is the coordinator's periodic drain.
//!
//! ```text
//! Data-change listener ──publish──┐
//!                                 ├──> ChangeQueue ──drain──> index writer
//! Full reindex ───enqueue_all─────┘         │
//!                                        clear (superseded by recreate)
//! ```

mod entry;
mod error;
mod file;
mod queue;
mod source;

pub use entry::{ChangeKind, ChangeQueueEntry};
pub use error::{QueueError, Result};
pub use file::FileChangeQueue;
pub use queue::{ChangeQueue, InMemoryChangeQueue};
pub use source::{InMemoryInstanceSource, InstanceSource};
