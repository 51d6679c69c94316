//! System keychain secret store
//!
//! Uses the OS keychain:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Key used to probe whether a keychain backend answers at all
const AVAILABILITY_PROBE_KEY: &str = "__poly_secret_availability_check__";

/// Secret store backed by the system keychain
///
/// Entries are namespaced by a service name: with service `poly-secret` and
/// key `github-token` the keychain entry is `poly-secret:github-token`.
/// The keychain offers no enumeration, so `list` is unsupported.
///
/// # Example
///
/// ```no_run
/// use poly_secret_core::secrets::{KeychainSecretStore, SecretStore};
///
/// let store = KeychainSecretStore::with_service("poly-secret");
/// store.store("github-token", "ghp_...").unwrap();
/// assert!(store.get("github-token").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct KeychainSecretStore {
    service_name: String,
}

impl KeychainSecretStore {
    /// Create a keychain store with the default service name "poly-secret"
    pub fn new() -> Self {
        Self::with_service("poly-secret")
    }

    /// Create a keychain store with a custom service name
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| SecretStoreError::Other(format!("Failed to create keychain entry: {}", e)))
    }

    /// Read a secret, distinguishing "absent" from "keychain broken"
    fn read(&self, key: &str) -> SecretStoreResult<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(keyring::Error::NoStorageAccess(e)) => {
                Err(SecretStoreError::NotAvailable(format!("keychain not accessible: {}", e)))
            }
            Err(e) => Err(SecretStoreError::Other(format!("Failed to read from keychain: {}", e))),
        }
    }
}

impl Default for KeychainSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn is_available(&self) -> bool {
        // Entry creation fails on headless servers without a keychain daemon
        match Entry::new(&self.service_name, AVAILABILITY_PROBE_KEY) {
            Ok(entry) => !matches!(
                entry.get_password(),
                Err(keyring::Error::NoStorageAccess(_)) | Err(keyring::Error::PlatformFailure(_))
            ),
            Err(_) => false,
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.read(key).ok().flatten()
    }

    fn try_get(&self, key: &str) -> SecretStoreResult<Option<String>> {
        self.read(key)
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| SecretStoreError::Other(format!("Failed to store in keychain: {}", e)))?;

        // Read back through a fresh entry so a write that only hit a cache is caught
        match self.read(key)? {
            Some(retrieved) if retrieved == value => Ok(()),
            Some(_) => Err(SecretStoreError::Other(
                "Keychain store verification failed: value mismatch".to_string(),
            )),
            None => Err(SecretStoreError::Other(
                "Keychain store verification failed: could not read back".to_string(),
            )),
        }
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(SecretStoreError::NotFound(key.to_string())),
            Err(e) => Err(SecretStoreError::Other(format!("Failed to delete from keychain: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(KeychainSecretStore::new().service_name(), "poly-secret");
        assert_eq!(KeychainSecretStore::with_service("x").service_name(), "x");
    }

    #[test]
    fn test_list_unsupported() {
        let store = KeychainSecretStore::new();
        assert!(matches!(store.list(), Err(SecretStoreError::Unsupported(_))));
    }

    // These tests require a running keychain service

    #[test]
    #[ignore] // Requires system keychain
    fn test_store_and_get() {
        let store = KeychainSecretStore::with_service("poly-secret-test");
        let _ = store.delete("test_key");

        store.store("test_key", "test_value").unwrap();
        assert_eq!(store.get("test_key"), Some("test_value".to_string()));

        store.delete("test_key").unwrap();
        assert_eq!(store.get("test_key"), None);
    }
}
