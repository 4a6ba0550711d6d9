use crate::definition::IndexDefinition;
use crate::error::{MetaError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Read-only lookup from entity type name to its [`IndexDefinition`].
///
/// Built once at startup; registration order is preserved so that sweeps
/// over [`all`](Self::all) are deterministic.
#[derive(Debug, Default)]
pub struct IndexDefinitionRegistry {
    definitions: Vec<IndexDefinition>,
    by_entity: HashMap<String, usize>,
}

impl IndexDefinitionRegistry {
    pub fn from_definitions(definitions: Vec<IndexDefinition>) -> Result<Self> {
        let mut by_entity = HashMap::with_capacity(definitions.len());
        for (idx, definition) in definitions.iter().enumerate() {
            if by_entity
                .insert(definition.entity_type.clone(), idx)
                .is_some()
            {
                return Err(MetaError::DuplicateDefinition(
                    definition.entity_type.clone(),
                ));
            }
        }
        Ok(Self {
            definitions,
            by_entity,
        })
    }

    /// Load definitions from a JSON file (an array of [`IndexDefinition`]).
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let definitions: Vec<IndexDefinition> = serde_json::from_slice(&bytes)?;
        Self::from_definitions(definitions)
    }

    #[must_use]
    pub fn definition_for(&self, entity_type: &str) -> Option<&IndexDefinition> {
        self.by_entity
            .get(entity_type)
            .map(|idx| &self.definitions[*idx])
    }

    /// Like [`definition_for`](Self::definition_for), but an absent entry is
    /// a configuration error rather than a normal outcome.
    pub fn require(&self, entity_type: &str) -> Result<&IndexDefinition> {
        self.definition_for(entity_type)
            .ok_or_else(|| MetaError::UnknownEntityType(entity_type.to_string()))
    }

    /// All definitions, in registration order.
    #[must_use]
    pub fn all(&self) -> &[IndexDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn def(entity: &str, index: &str) -> IndexDefinition {
        IndexDefinition::new(entity, index, json!({ "properties": {} }))
    }

    #[test]
    fn lookup_by_entity_type() {
        let registry = IndexDefinitionRegistry::from_definitions(vec![
            def("Order", "search_order"),
            def("Customer", "search_customer"),
        ])
        .unwrap();

        assert_eq!(
            registry.definition_for("Order").map(|d| d.index_name.as_str()),
            Some("search_order")
        );
        assert!(registry.definition_for("Invoice").is_none());
    }

    #[test]
    fn require_fails_for_unknown_type() {
        let registry =
            IndexDefinitionRegistry::from_definitions(vec![def("Order", "search_order")]).unwrap();

        let err = registry.require("Invoice").unwrap_err();
        assert!(matches!(err, MetaError::UnknownEntityType(name) if name == "Invoice"));
    }

    #[test]
    fn registration_order_is_preserved() {
        let registry = IndexDefinitionRegistry::from_definitions(vec![
            def("B", "search_b"),
            def("A", "search_a"),
            def("C", "search_c"),
        ])
        .unwrap();

        let order: Vec<&str> = registry.all().iter().map(|d| d.entity_type.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn duplicate_definitions_are_rejected() {
        let err = IndexDefinitionRegistry::from_definitions(vec![
            def("Order", "search_order"),
            def("Order", "search_order_v2"),
        ])
        .unwrap_err();

        assert!(matches!(err, MetaError::DuplicateDefinition(name) if name == "Order"));
    }

    #[tokio::test]
    async fn load_from_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("indexes.json");
        let body = serde_json::to_vec_pretty(&vec![
            def("Order", "search_order"),
            def("Customer", "search_customer"),
        ])
        .unwrap();
        tokio::fs::write(&path, body).await.unwrap();

        let registry = IndexDefinitionRegistry::load(&path).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.definition_for("Customer").is_some());
    }
}
