//! Adapter exposing a `SecretStore` as a set of operations

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::traits::{required_str, Adapter, AdapterError, AdapterResult, Operation, OperationDescriptor};
use crate::logging::SharedLogger;
use crate::secrets::{SecretInfo, SecretStore, SecretStoreError};

/// Wraps a secret store behind the adapter contract
///
/// Operation names are prefixed with the adapter name so several stores can
/// be served side by side: an adapter named `env` exposes `env_get_secret`,
/// `env_has_secret` and `env_list_secrets`, plus `env_set_secret` and
/// `env_delete_secret` when the store is writable.
///
/// Store calls may block (keychain over D-Bus), so each runs on the blocking pool.
pub struct StoreAdapter {
    name: String,
    store: Arc<dyn SecretStore>,
    logger: SharedLogger,
}

impl StoreAdapter {
    pub fn new(name: impl Into<String>, store: Arc<dyn SecretStore>, logger: SharedLogger) -> Self {
        Self {
            name: name.into(),
            store,
            logger,
        }
    }

    fn op_name(&self, suffix: &str) -> String {
        format!("{}_{}", self.name, suffix)
    }

    fn label(&self) -> String {
        format!("'{}' ({} store)", self.name, self.store.name())
    }

    async fn run_blocking<T, F>(store: Arc<dyn SecretStore>, f: F) -> AdapterResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn SecretStore) -> AdapterResult<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| AdapterError::Other(format!("store task failed: {}", e)))?
    }

    fn get_op(&self) -> Operation {
        let store = Arc::clone(&self.store);
        let descriptor = OperationDescriptor::new(
            self.op_name("get_secret"),
            format!("Fetch a secret value from {}", self.label()),
        )
        .with_string_params(&[("key", "Name of the secret")]);

        Operation::new(descriptor, move |args: Value| {
            let store = Arc::clone(&store);
            async move {
                let key = required_str(&args, "key")?.to_string();
                Self::run_blocking(store, move |store| {
                    let value = store
                        .try_get(&key)?
                        .ok_or_else(|| SecretStoreError::NotFound(key.clone()))?;
                    Ok(json!({ "key": key, "value": value, "source": store.name() }))
                })
                .await
            }
        })
    }

    fn has_op(&self) -> Operation {
        let store = Arc::clone(&self.store);
        let descriptor = OperationDescriptor::new(
            self.op_name("has_secret"),
            format!("Check whether a secret exists in {}", self.label()),
        )
        .with_string_params(&[("key", "Name of the secret")]);

        Operation::new(descriptor, move |args: Value| {
            let store = Arc::clone(&store);
            async move {
                let key = required_str(&args, "key")?.to_string();
                Self::run_blocking(store, move |store| {
                    let info = match store.try_get(&key)? {
                        Some(_) => SecretInfo::found(key, store.name()),
                        None => SecretInfo::missing(key),
                    };
                    serde_json::to_value(info).map_err(|e| AdapterError::Other(e.to_string()))
                })
                .await
            }
        })
    }

    fn list_op(&self) -> Operation {
        let store = Arc::clone(&self.store);
        let descriptor = OperationDescriptor::new(
            self.op_name("list_secrets"),
            format!("List secret names visible in {}", self.label()),
        );

        Operation::new(descriptor, move |_args: Value| {
            let store = Arc::clone(&store);
            async move {
                Self::run_blocking(store, |store| {
                    let keys = store.list()?;
                    Ok(json!({ "count": keys.len(), "keys": keys }))
                })
                .await
            }
        })
    }

    fn set_op(&self) -> Operation {
        let store = Arc::clone(&self.store);
        let descriptor = OperationDescriptor::new(
            self.op_name("set_secret"),
            format!("Create or overwrite a secret in {}", self.label()),
        )
        .with_string_params(&[("key", "Name of the secret"), ("value", "Secret value")]);

        Operation::new(descriptor, move |args: Value| {
            let store = Arc::clone(&store);
            async move {
                let key = required_str(&args, "key")?.to_string();
                let value = required_str(&args, "value")?.to_string();
                Self::run_blocking(store, move |store| {
                    store.store(&key, &value)?;
                    Ok(json!({ "key": key, "stored": true }))
                })
                .await
            }
        })
    }

    fn delete_op(&self) -> Operation {
        let store = Arc::clone(&self.store);
        let descriptor = OperationDescriptor::new(
            self.op_name("delete_secret"),
            format!("Delete a secret from {}", self.label()),
        )
        .with_string_params(&[("key", "Name of the secret")]);

        Operation::new(descriptor, move |args: Value| {
            let store = Arc::clone(&store);
            async move {
                let key = required_str(&args, "key")?.to_string();
                Self::run_blocking(store, move |store| {
                    store.delete(&key)?;
                    Ok(json!({ "key": key, "deleted": true }))
                })
                .await
            }
        })
    }
}

#[async_trait]
impl Adapter for StoreAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> AdapterResult<()> {
        let available = Self::run_blocking(Arc::clone(&self.store), |store| Ok(store.is_available())).await?;
        if !available {
            return Err(AdapterError::ConnectionFailed(format!(
                "{} store is not available",
                self.store.name()
            )));
        }
        self.logger.debug(&format!("[StoreAdapter] {} ready", self.label()));
        Ok(())
    }

    async fn disconnect(&self) -> AdapterResult<()> {
        Ok(())
    }

    fn operations(&self) -> Vec<Operation> {
        let mut ops = vec![self.get_op(), self.has_op(), self.list_op()];
        if self.store.is_writable() {
            ops.push(self.set_op());
            ops.push(self.delete_op());
        }
        ops
    }
}
