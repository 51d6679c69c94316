//! Secret store contract wrapped by the store adapters

use serde::Serialize;
use thiserror::Error;

/// Presence report for one key, as returned by `has_secret`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretInfo {
    pub key: String,
    pub available: bool,
    /// Store that holds the key, `"none"` when absent
    pub source: String,
}

impl SecretInfo {
    pub fn found(key: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            available: true,
            source: source.into(),
        }
    }

    pub fn missing(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            available: false,
            source: "none".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Store not available: {0}")]
    NotAvailable(String),

    #[error("Operation not supported by this store: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Other(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// A synchronous key/value secret backend
///
/// Calls may block (the keychain talks to a system daemon); `StoreAdapter`
/// runs them on the blocking pool. Read-only stores override `is_writable`
/// and inherit the `ReadOnly` defaults for `store` and `delete`.
///
/// ```
/// use poly_secret_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("db-password", "hunter2").unwrap();
/// assert!(store.get_info("db-password").available);
/// ```
pub trait SecretStore: Send + Sync {
    /// Short store name, reported as `source`
    fn name(&self) -> &str;

    /// Whether the backend answers at all; checked once at connect
    fn is_available(&self) -> bool {
        true
    }

    fn is_writable(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Option<String>;

    /// Like `get`, but backend failures surface as errors instead of `None`
    fn try_get(&self, key: &str) -> SecretStoreResult<Option<String>> {
        Ok(self.get(key))
    }

    /// Create or overwrite
    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    /// Remove; a missing key is `NotFound`
    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    /// Visible key names, sorted
    fn list(&self) -> SecretStoreResult<Vec<String>> {
        Err(SecretStoreError::Unsupported(format!(
            "{} cannot enumerate secrets",
            self.name()
        )))
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        match self.get(key) {
            Some(_) => SecretInfo::found(key, self.name()),
            None => SecretInfo::missing(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl SecretStore for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn is_writable(&self) -> bool {
            false
        }

        fn get(&self, key: &str) -> Option<String> {
            (key == "present").then(|| "v".to_string())
        }
    }

    #[test]
    fn test_defaults_for_read_only_store() {
        let store = Fixed;
        assert!(matches!(store.store("k", "v"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.delete("k"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.list(), Err(SecretStoreError::Unsupported(_))));
    }

    #[test]
    fn test_try_get_defaults_to_get() {
        let store = Fixed;
        assert_eq!(store.try_get("present").unwrap(), Some("v".to_string()));
        assert_eq!(store.try_get("absent").unwrap(), None);
    }

    #[test]
    fn test_get_info() {
        let store = Fixed;
        assert_eq!(store.get_info("present"), SecretInfo::found("present", "fixed"));

        let missing = store.get_info("absent");
        assert!(!missing.available);
        assert_eq!(missing.source, "none");
        assert_eq!(missing.key, "absent");
    }
}
