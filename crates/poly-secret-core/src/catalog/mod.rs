//! Operation catalog
//!
//! Merges the operations of connected adapters into one flat, name-keyed
//! catalog. The first adapter to register a name keeps it.

use std::collections::HashMap;

use crate::adapters::{InvokeFn, OperationDescriptor};
use crate::logging::Logger;
use crate::registry::AdapterHandle;

/// One advertised operation and the adapter that serves it
#[derive(Clone)]
pub struct CatalogEntry {
    pub adapter: String,
    pub descriptor: OperationDescriptor,
    pub invoke: InvokeFn,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("adapter", &self.adapter)
            .field("name", &self.descriptor.name)
            .finish_non_exhaustive()
    }
}

/// A dropped duplicate operation name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub operation: String,
    pub kept_adapter: String,
    pub dropped_adapter: String,
}

/// Read-only name → operation map, iterated in insertion order
#[derive(Debug, Default)]
pub struct OperationCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
    collisions: Vec<NameCollision>,
}

impl OperationCatalog {
    /// Build the catalog from a snapshot of connected handles
    ///
    /// Handles are visited in the order given, operations in declaration
    /// order. Never fails: a duplicate name is dropped with a warning.
    pub fn build<'a, I>(handles: I, logger: &dyn Logger) -> Self
    where
        I: IntoIterator<Item = &'a AdapterHandle>,
    {
        let mut catalog = Self::default();

        for handle in handles {
            for operation in handle.operations() {
                let name = operation.name();
                if let Some(&existing) = catalog.index.get(name) {
                    let kept = catalog.entries[existing].adapter.clone();
                    logger.warn(&format!(
                        "[OperationCatalog] Operation '{}' from '{}' ignored: already provided by '{}'",
                        name,
                        handle.identity(),
                        kept
                    ));
                    catalog.collisions.push(NameCollision {
                        operation: name.to_string(),
                        kept_adapter: kept,
                        dropped_adapter: handle.identity().to_string(),
                    });
                    continue;
                }

                catalog.index.insert(name.to_string(), catalog.entries.len());
                catalog.entries.push(CatalogEntry {
                    adapter: handle.identity().to_string(),
                    descriptor: operation.descriptor.clone(),
                    invoke: operation.invoke.clone(),
                });
            }
        }

        logger.debug(&format!(
            "[OperationCatalog] Built with {} operations ({} collisions)",
            catalog.entries.len(),
            catalog.collisions.len()
        ));
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(CatalogEntry::name).collect()
    }

    /// Collisions dropped during build
    pub fn collisions(&self) -> &[NameCollision] {
        &self.collisions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAdapter, MockMode};
    use crate::logging::{LogLevel, MemoryLogger, NoOpLogger};
    use crate::registry::AdapterRegistry;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    async fn connected(adapters: Vec<MockAdapter>) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new(Arc::new(NoOpLogger::new()));
        registry.register_all(adapters.into_iter().map(AdapterHandle::from));
        registry.connect_all().await;
        registry
    }

    #[tokio::test]
    async fn test_union_of_names_without_collisions() {
        let registry = connected(vec![
            MockAdapter::new("a")
                .with_operation("get-secret", MockMode::Echo)
                .with_operation("has-secret", MockMode::Echo),
            MockAdapter::new("b").with_operation("list-secrets", MockMode::Echo),
        ])
        .await;

        let catalog = OperationCatalog::build(registry.connected_handles(), &NoOpLogger::new());

        let names: HashSet<&str> = catalog.names().into_iter().collect();
        let expected: HashSet<&str> = ["get-secret", "has-secret", "list-secrets"].into_iter().collect();
        assert_eq!(names, expected);
        assert!(catalog.collisions().is_empty());
        for entry in catalog.entries() {
            assert_eq!(catalog.get(entry.name()).unwrap().name(), entry.descriptor.name);
        }
    }

    #[tokio::test]
    async fn test_insertion_order() {
        let registry = connected(vec![
            MockAdapter::new("a")
                .with_operation("z", MockMode::Echo)
                .with_operation("m", MockMode::Echo),
            MockAdapter::new("b").with_operation("a", MockMode::Echo),
        ])
        .await;

        let catalog = OperationCatalog::build(registry.connected_handles(), &NoOpLogger::new());
        assert_eq!(catalog.names(), vec!["z", "m", "a"]);
    }

    #[tokio::test]
    async fn test_first_registered_wins() {
        let registry = connected(vec![
            MockAdapter::new("a").with_operation("X", MockMode::Fixed(json!("from-a"))),
            MockAdapter::new("b").with_operation("X", MockMode::Fixed(json!("from-b"))),
        ])
        .await;
        let logger = MemoryLogger::new();

        let catalog = OperationCatalog::build(registry.connected_handles(), &logger);

        assert_eq!(catalog.len(), 1);
        let entry = catalog.get("X").unwrap();
        assert_eq!(entry.adapter, "a");
        assert_eq!((entry.invoke)(json!({})).await.unwrap(), json!("from-a"));
        assert_eq!(
            catalog.collisions(),
            &[NameCollision {
                operation: "X".into(),
                kept_adapter: "a".into(),
                dropped_adapter: "b".into(),
            }]
        );

        let warnings = logger.messages_at(LogLevel::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("'X'"));
        assert!(warnings[0].contains("'a'"));
        assert!(warnings[0].contains("'b'"));
    }

    #[tokio::test]
    async fn test_duplicate_within_one_adapter() {
        let registry = connected(vec![MockAdapter::new("a")
            .with_operation("X", MockMode::Fixed(json!(1)))
            .with_operation("X", MockMode::Fixed(json!(2)))])
        .await;

        let catalog = OperationCatalog::build(registry.connected_handles(), &NoOpLogger::new());

        assert_eq!(catalog.len(), 1);
        assert_eq!((catalog.get("X").unwrap().invoke)(json!({})).await.unwrap(), json!(1));
        assert_eq!(catalog.collisions().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_adapters_contribute_nothing() {
        let registry = connected(vec![
            MockAdapter::new("a").with_operation("get-secret", MockMode::Echo),
            MockAdapter::new("c")
                .with_operation("rotate-secret", MockMode::Echo)
                .failing_connect("refused"),
        ])
        .await;

        let catalog = OperationCatalog::build(registry.connected_handles(), &NoOpLogger::new());

        assert!(catalog.contains("get-secret"));
        assert!(!catalog.contains("rotate-secret"));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = OperationCatalog::build(std::iter::empty(), &NoOpLogger::new());
        assert!(catalog.is_empty());
        assert!(catalog.get("anything").is_none());
    }
}
