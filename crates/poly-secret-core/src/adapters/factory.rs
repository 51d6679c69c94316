//! Builds adapters from configuration entries

use std::sync::Arc;

use super::mcp_adapter::McpProxyAdapter;
use super::mock::{MockAdapter, MockMode};
use super::store_adapter::StoreAdapter;
use super::traits::Adapter;
use crate::config::{AdapterConfig, AdapterKind, ConfigError, ConfigFile, ConfigResult};
use crate::logging::SharedLogger;
use crate::mcp::McpEndpoint;
use crate::secrets::{EnvSecretStore, KeychainSecretStore, MemorySecretStore, SecretStore};

/// Adapter kinds the factory understands, with a short description
const KINDS: &[(&str, &str)] = &[
    ("env", "Read secrets from environment variables"),
    ("keychain", "Store secrets in the system keychain"),
    ("memory", "In-memory storage (testing)"),
    ("mcp", "Re-export the tools of an upstream MCP server"),
    ("mock", "Fake backend whose operations echo their arguments"),
];

/// Maps `AdapterConfig` entries to adapter instances
#[derive(Clone)]
pub struct AdapterFactory {
    logger: SharedLogger,
}

impl AdapterFactory {
    pub fn new(logger: SharedLogger) -> Self {
        Self { logger }
    }

    /// Known kinds as `(kind, description)`
    pub fn list_kinds() -> Vec<(&'static str, &'static str)> {
        KINDS.to_vec()
    }

    /// Create one adapter
    pub fn create(&self, config: &AdapterConfig) -> ConfigResult<Arc<dyn Adapter>> {
        config.validate()?;
        let logger = Arc::clone(&self.logger);
        let name = config.name.clone();

        let adapter: Arc<dyn Adapter> = match &config.kind {
            AdapterKind::Env { prefix } => {
                let store = match prefix {
                    Some(prefix) => EnvSecretStore::with_prefix(prefix.clone()),
                    None => EnvSecretStore::new(),
                };
                self.store_adapter(name, Arc::new(store))
            }
            AdapterKind::Keychain { service } => {
                let store = match service {
                    Some(service) => KeychainSecretStore::with_service(service.clone()),
                    None => KeychainSecretStore::new(),
                };
                self.store_adapter(name, Arc::new(store))
            }
            AdapterKind::Memory { secrets } => {
                self.store_adapter(name, Arc::new(MemorySecretStore::with_secrets(secrets.clone())))
            }
            AdapterKind::Mcp { url, socket } => {
                let endpoint = match (url, socket) {
                    (Some(url), None) => McpEndpoint::Http(url.clone()),
                    (None, Some(socket)) => McpEndpoint::Unix(socket.clone()),
                    _ => {
                        return Err(ConfigError::InvalidAdapter {
                            name,
                            message: "one of 'url' or 'socket' is required".to_string(),
                        })
                    }
                };
                Arc::new(McpProxyAdapter::new(name, endpoint, logger))
            }
            AdapterKind::Mock { operations, fail_connect } => {
                let mut mock = MockAdapter::new(name);
                for operation in operations {
                    mock = mock.with_operation(operation.clone(), MockMode::Echo);
                }
                if let Some(message) = fail_connect {
                    mock = mock.failing_connect(message.clone());
                }
                Arc::new(mock)
            }
        };

        self.logger.debug(&format!(
            "[AdapterFactory] Created '{}' ({})",
            config.name,
            config.kind.as_str()
        ));
        Ok(adapter)
    }

    /// Create every enabled adapter, in configuration order
    pub fn build_all(&self, config: &ConfigFile) -> ConfigResult<Vec<Arc<dyn Adapter>>> {
        config.validate()?;
        config
            .enabled_adapters()
            .map(|entry| self.create(entry))
            .collect()
    }

    fn store_adapter(&self, name: String, store: Arc<dyn SecretStore>) -> Arc<dyn Adapter> {
        Arc::new(StoreAdapter::new(name, store, Arc::clone(&self.logger)))
    }
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory").finish_non_exhaustive()
    }
}
