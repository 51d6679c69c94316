//! Configuration types and provider trait

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Name advertised to MCP clients unless configured otherwise
pub const DEFAULT_SERVER_NAME: &str = "poly-secret-mcp";

/// Environment prefix used by the built-in `env` adapter
pub const DEFAULT_ENV_PREFIX: &str = "POLY_SECRET_";

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Duplicate adapter name: {0}")]
    DuplicateAdapter(String),

    #[error("Invalid adapter '{name}': {message}")]
    InvalidAdapter { name: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Name reported in the MCP handshake
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Upper bound for a single adapter call, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke_timeout_ms: Option<u64>,
    /// Additional log file for diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_server_name() -> String {
    DEFAULT_SERVER_NAME.to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            invoke_timeout_ms: None,
            log_file: None,
        }
    }
}

impl ServerSettings {
    /// Invocation timeout; zero disables it
    pub fn invoke_timeout(&self) -> Option<Duration> {
        self.invoke_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Backend-specific adapter settings, selected by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AdapterKind {
    /// Environment variables
    Env {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },
    /// OS keychain
    Keychain {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<String>,
    },
    /// In-process map
    Memory {
        #[serde(default)]
        secrets: BTreeMap<String, String>,
    },
    /// Upstream MCP server, reached over HTTP or a Unix socket
    Mcp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        socket: Option<PathBuf>,
    },
    /// Fake backend whose operations echo their arguments
    Mock {
        #[serde(default)]
        operations: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fail_connect: Option<String>,
    },
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Env { .. } => "env",
            AdapterKind::Keychain { .. } => "keychain",
            AdapterKind::Memory { .. } => "memory",
            AdapterKind::Mcp { .. } => "mcp",
            AdapterKind::Mock { .. } => "mock",
        }
    }
}

/// One configured adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Adapter identity; also the prefix of store adapter operations
    pub name: String,
    /// Disabled adapters are skipped entirely
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub kind: AdapterKind,
}

fn default_enabled() -> bool {
    true
}

impl AdapterConfig {
    pub fn new(name: impl Into<String>, kind: AdapterKind) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            kind,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn invalid(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidAdapter {
            name: self.name.clone(),
            message: message.into(),
        }
    }

    /// Check the entry on its own
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name must not be empty"));
        }
        // The name prefixes tool names, which MCP limits to this alphabet
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(self.invalid("name may only contain ASCII letters, digits, '_' and '-'"));
        }
        if let AdapterKind::Mcp { url, socket } = &self.kind {
            match (url, socket) {
                (Some(_), Some(_)) => return Err(self.invalid("set either 'url' or 'socket', not both")),
                (None, None) => return Err(self.invalid("one of 'url' or 'socket' is required")),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSettings,

    /// Adapters in registration order; earlier entries win name collisions
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

impl ConfigFile {
    /// Configuration used when no file exists anywhere
    pub fn builtin() -> Self {
        Self {
            server: ServerSettings::default(),
            adapters: vec![AdapterConfig::new(
                "env",
                AdapterKind::Env {
                    prefix: Some(DEFAULT_ENV_PREFIX.to_string()),
                },
            )],
        }
    }

    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: ConfigFile = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check every entry and reject duplicate adapter names
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = std::collections::HashSet::new();
        for adapter in &self.adapters {
            adapter.validate()?;
            if !seen.insert(adapter.name.as_str()) {
                return Err(ConfigError::DuplicateAdapter(adapter.name.clone()));
            }
        }
        Ok(())
    }

    /// Enabled adapters, in configured order
    pub fn enabled_adapters(&self) -> impl Iterator<Item = &AdapterConfig> {
        self.adapters.iter().filter(|a| a.enabled)
    }
}

/// Source of server configuration
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: YAML file (user or workspace level)
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Load the full configuration
    async fn load(&self) -> ConfigResult<ConfigFile>;
}
