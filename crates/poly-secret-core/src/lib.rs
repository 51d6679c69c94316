//! Poly Secret Core
//!
//! One MCP tool surface in front of several secret backends.
//! Adapters are connected independently, their operations merged into a
//! single catalog, and every call routed to exactly one adapter.
//!
//! ```rust,ignore
//! use poly_secret_core::{load_config, ConsoleLogger, Runtime};
//! use rmcp::ServiceExt;
//!
//! let logger = Arc::new(ConsoleLogger::new());
//! let (config, _) = load_config(None, &cwd).await?;
//! let mut runtime = Runtime::from_config(&config, logger).await?;
//! eprintln!("{}", runtime.banner());
//!
//! runtime.server().serve(rmcp::transport::stdio()).await?.waiting().await?;
//! runtime.shutdown().await;
//! ```

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod mcp;
pub mod registry;
pub mod runtime;
pub mod secrets;
pub mod session;

pub use adapters::{
    Adapter, AdapterError, AdapterFactory, AdapterResult, McpEndpoint, McpProxyAdapter, MockAdapter, MockMode,
    Operation, OperationDescriptor, StoreAdapter,
};

pub use catalog::{CatalogEntry, NameCollision, OperationCatalog};

pub use config::{
    load_config, AdapterConfig, AdapterKind, ConfigError, ConfigFile, ConfigProvider, ConfigResult,
    FileConfigProvider, MemoryConfigProvider, ServerSettings,
};

pub use dispatch::{DispatchRouter, DispatchStats, FailureKind, InvocationFailure, InvocationOutcome, InvocationRequest};

pub use logging::{ConsoleLogger, FileLogger, LogLevel, Logger, NoOpLogger, SharedLogger, TeeLogger};

pub use mcp::{McpClient, McpError, McpResult};

pub use registry::{AdapterFailure, AdapterHandle, AdapterRegistry, ConnectReport, ConnectionState};

pub use runtime::Runtime;

pub use secrets::{
    EnvSecretStore, KeychainSecretStore, MemorySecretStore, SecretInfo, SecretStore, SecretStoreError,
    SecretStoreResult,
};

pub use session::{CallOperationResponse, PolySecretServer, SessionFrontEnd};
