//! Environment variable secret store

use std::env;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secret store that reads from environment variables
///
/// This store is read-only. With a prefix configured, a key is only ever
/// looked up as `PREFIX` + the key upper-cased with `-`, `.` and `/` turned
/// into `_`; variables outside the prefix are unreachable. Without a prefix
/// the key is the variable name:
///
/// - prefix `APP_`, key `db-password` → `APP_DB_PASSWORD`
///
/// Listing only enumerates variables carrying the prefix, with the prefix
/// stripped. Without a prefix the store refuses to list, so it never dumps
/// the whole environment.
///
/// # Example
///
/// ```
/// use poly_secret_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::with_prefix("APP_");
/// // store.get("db-password") reads `APP_DB_PASSWORD` and nothing else
/// assert!(!store.is_writable());
/// ```
#[derive(Debug, Default, Clone)]
pub struct EnvSecretStore {
    prefix: Option<String>,
}

impl EnvSecretStore {
    /// Create a store without a prefix
    pub fn new() -> Self {
        Self { prefix: None }
    }

    /// Create a store that maps keys under `prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: if prefix.is_empty() { None } else { Some(prefix) },
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Environment variable name a key maps to under the prefix
    pub fn env_var_for(&self, key: &str) -> Option<String> {
        self.prefix.as_ref().map(|prefix| {
            let normalized: String = key
                .chars()
                .map(|c| match c {
                    '-' | '.' | '/' => '_',
                    other => other.to_ascii_uppercase(),
                })
                .collect();
            format!("{}{}", prefix, normalized)
        })
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn is_writable(&self) -> bool {
        false
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.env_var_for(key) {
            Some(name) => Self::read(&name),
            None => Self::read(key),
        }
    }

    fn list(&self) -> SecretStoreResult<Vec<String>> {
        let prefix = self.prefix.as_deref().ok_or_else(|| {
            SecretStoreError::Unsupported("env store without a prefix cannot list secrets".to_string())
        })?;

        let mut keys: Vec<String> = env::vars()
            .filter(|(_, value)| !value.is_empty())
            .filter_map(|(name, _)| name.strip_prefix(prefix).map(str::to_string))
            .filter(|key| !key.is_empty())
            .collect();
        keys.sort();
        Ok(keys)
    }
}
