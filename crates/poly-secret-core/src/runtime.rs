//! Session runtime: connect → catalog → serve → disconnect

use std::sync::Arc;

use crate::adapters::{Adapter, AdapterFactory};
use crate::catalog::OperationCatalog;
use crate::config::{ConfigFile, ConfigResult, ServerSettings};
use crate::dispatch::DispatchRouter;
use crate::logging::SharedLogger;
use crate::registry::{AdapterFailure, AdapterHandle, AdapterRegistry, ConnectReport};
use crate::session::{PolySecretServer, SessionFrontEnd};

/// Everything one server session owns
pub struct Runtime {
    registry: AdapterRegistry,
    router: Arc<DispatchRouter>,
    report: ConnectReport,
    settings: ServerSettings,
    logger: SharedLogger,
}

impl Runtime {
    /// Connect the adapters and build the catalog
    ///
    /// Never fails: adapters that cannot connect are logged and left out.
    pub async fn start(adapters: Vec<Arc<dyn Adapter>>, settings: ServerSettings, logger: SharedLogger) -> Self {
        let mut registry = AdapterRegistry::new(Arc::clone(&logger));
        registry.register_all(adapters.into_iter().map(AdapterHandle::new));
        let report = registry.connect_all().await;

        let catalog = OperationCatalog::build(registry.connected_handles(), logger.as_ref());
        let router = DispatchRouter::new(Arc::new(catalog), Arc::clone(&logger))
            .with_timeout(settings.invoke_timeout());

        Self {
            registry,
            router: Arc::new(router),
            report,
            settings,
            logger,
        }
    }

    /// Build adapters from configuration, then `start`
    pub async fn from_config(config: &ConfigFile, logger: SharedLogger) -> ConfigResult<Self> {
        let adapters = AdapterFactory::new(Arc::clone(&logger)).build_all(config)?;
        Ok(Self::start(adapters, config.server.clone(), logger).await)
    }

    /// MCP handler bound to this session's catalog
    pub fn server(&self) -> PolySecretServer {
        PolySecretServer::new(
            SessionFrontEnd::new(Arc::clone(&self.router)),
            self.settings.name.clone(),
            Arc::clone(&self.logger),
        )
    }

    pub fn router(&self) -> &DispatchRouter {
        &self.router
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn connect_report(&self) -> &ConnectReport {
        &self.report
    }

    /// One-line startup summary for the operator
    pub fn banner(&self) -> String {
        let mut banner = format!(
            "{} v{}: {}/{} adapters connected, {} tools",
            self.settings.name,
            env!("CARGO_PKG_VERSION"),
            self.report.connected.len(),
            self.registry.len(),
            self.router.catalog().len()
        );
        if !self.report.failed.is_empty() {
            let failed: Vec<&str> = self.report.failed.iter().map(|f| f.adapter.as_str()).collect();
            banner.push_str(&format!(" (failed: {})", failed.join(", ")));
        }
        banner
    }

    /// Disconnect every adapter; safe to call more than once
    pub async fn shutdown(&mut self) -> Vec<AdapterFailure> {
        let failures = self.registry.disconnect_all().await;
        let stats = self.router.stats();
        self.logger.info(&format!(
            "[Runtime] Shut down after {} calls ({} failed, {} unknown, {} timed out)",
            stats.total(),
            stats.invocation_failures,
            stats.unknown_operations,
            stats.timeouts
        ));
        failures
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("registry", &self.registry)
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAdapter, MockMode};
    use crate::config::{AdapterConfig, AdapterKind};
    use crate::logging::NoOpLogger;
    use crate::registry::ConnectionState;
    use std::collections::BTreeMap;

    fn logger() -> SharedLogger {
        Arc::new(NoOpLogger::new())
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let a = MockAdapter::new("a").with_operation("get-secret", MockMode::Echo);
        let c = MockAdapter::new("c")
            .with_operation("rotate-secret", MockMode::Echo)
            .failing_connect("refused");
        let adapters: Vec<Arc<dyn Adapter>> = vec![Arc::new(a.clone()), Arc::new(c.clone())];

        let mut runtime = Runtime::start(adapters, ServerSettings::default(), logger()).await;

        assert_eq!(runtime.router().catalog().names(), vec!["get-secret"]);
        assert_eq!(runtime.banner(), format!(
            "poly-secret-mcp v{}: 1/2 adapters connected, 1 tools (failed: c)",
            env!("CARGO_PKG_VERSION")
        ));

        assert!(runtime.shutdown().await.is_empty());
        assert!(runtime.shutdown().await.is_empty());
        assert_eq!(a.disconnect_calls(), 1);
        assert_eq!(c.disconnect_calls(), 0);
        assert_eq!(
            runtime.registry().handle("a").map(|h| h.state()),
            Some(ConnectionState::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_empty_runtime_serves_empty_list() {
        let runtime = Runtime::start(Vec::new(), ServerSettings::default(), logger()).await;

        assert!(runtime.server().tools().is_empty());
        assert!(runtime.banner().contains("0/0 adapters connected, 0 tools"));
    }

    #[tokio::test]
    async fn test_from_config() {
        let mut secrets = BTreeMap::new();
        secrets.insert("db".to_string(), "hunter2".to_string());
        let config = ConfigFile {
            server: ServerSettings {
                name: "secrets".into(),
                ..Default::default()
            },
            adapters: vec![AdapterConfig::new("vault", AdapterKind::Memory { secrets })],
        };

        let runtime = Runtime::from_config(&config, logger()).await.unwrap();
        let server = runtime.server();

        let response = server
            .front_end()
            .call_operation("vault_get_secret", serde_json::json!({ "key": "db" }))
            .await;
        assert!(!response.is_error);
        assert!(response.payload.contains("hunter2"));
        assert!(runtime.banner().starts_with("secrets v"));
    }
}
