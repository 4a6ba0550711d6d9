use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Binds one logical entity type to a search index and its mapping.
///
/// Immutable once registered. The mapping is an opaque blob handed to the
/// search engine verbatim when the index is (re)created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub entity_type: String,
    pub index_name: String,
    pub mapping: Value,
}

impl IndexDefinition {
    pub fn new(
        entity_type: impl Into<String>,
        index_name: impl Into<String>,
        mapping: Value,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            index_name: index_name.into(),
            mapping,
        }
    }
}
