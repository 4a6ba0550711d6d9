use serde::{Deserialize, Serialize};

/// Whether a queued change refreshes a document or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Upsert,
    Delete,
}

/// One "entity instance needs (re)indexing" marker.
///
/// Created when an instance is enqueued, consumed when drained and applied
/// to the index; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQueueEntry {
    pub entity_type: String,
    pub instance_id: String,
    pub kind: ChangeKind,
}

impl ChangeQueueEntry {
    pub fn upsert(entity_type: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            instance_id: instance_id.into(),
            kind: ChangeKind::Upsert,
        }
    }

    pub fn delete(entity_type: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            instance_id: instance_id.into(),
            kind: ChangeKind::Delete,
        }
    }
}
