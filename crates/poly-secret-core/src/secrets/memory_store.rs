//! In-process secret map

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secrets held in a sorted map, seeded from config or built empty
///
/// Used by the `memory` adapter kind and throughout the tests. Nothing is
/// persisted.
///
/// ```
/// use poly_secret_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::with_secrets([("api-token", "t0k3n")]);
/// assert_eq!(store.get("api-token").as_deref(), Some("t0k3n"));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<BTreeMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from key/value pairs
    pub fn with_secrets<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: RwLock::new(initial.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }

    fn list(&self) -> SecretStoreResult<Vec<String>> {
        Ok(self.secrets.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_overwrite_and_delete() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());

        store.store("db", "one").unwrap();
        store.store("db", "two").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("db").as_deref(), Some("two"));

        store.delete("db").unwrap();
        assert_eq!(store.get("db"), None);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = MemorySecretStore::new();
        assert!(matches!(store.delete("ghost"), Err(SecretStoreError::NotFound(k)) if k == "ghost"));
    }

    #[test]
    fn test_seeded_list_is_sorted() {
        let store = MemorySecretStore::with_secrets([("zeta", "1"), ("alpha", "2")]);
        assert_eq!(store.list().unwrap(), vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[test]
    fn test_get_info_reports_source() {
        let store = MemorySecretStore::with_secrets([("exists", "v")]);

        let info = store.get_info("exists");
        assert!(info.available);
        assert_eq!(info.source, "memory");
        assert!(!store.get_info("nonexistent").available);
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(MemorySecretStore::new());

        let writers: Vec<_> = (0..10)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.store(&format!("key_{}", i), "v").unwrap())
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
