//! File-based configuration provider (YAML)
//!
//! Supports user-level (`<config dir>/poly-secret/config.yaml`) and
//! workspace-level (`.config/poly-secret/config.yaml`) files.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ConfigError, ConfigFile, ConfigProvider, ConfigResult};

/// Environment variable pointing at an explicit config file
pub const CONFIG_ENV_VAR: &str = "POLY_SECRET_CONFIG";

/// Config level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// Passed explicitly (`--config` or `POLY_SECRET_CONFIG`)
    Explicit,
    /// User-level config
    User,
    /// Workspace-level config (`.config/poly-secret/config.yaml` under a root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::Explicit => "explicit",
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// A missing file loads as an empty configuration, except at the explicit
/// level, where it is an error.
///
/// # Example
///
/// ```no_run
/// use poly_secret_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider
    pub fn user() -> Self {
        // XDG config directory (~/.config on Linux, ~/Library/Application Support on macOS)
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("poly-secret").join("config.yaml"), ConfigLevel::User)
    }

    /// Create a workspace-level config provider
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("poly-secret")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn read(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            if self.level == ConfigLevel::Explicit {
                return Err(ConfigError::NotFound(self.path.clone()));
            }
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        ConfigFile::from_yaml(&content)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.read()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Write a configuration, creating parent directories
    pub fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, config.to_yaml()?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn load(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }
}

/// Pick the configuration file to use
///
/// Order: explicit path, then `POLY_SECRET_CONFIG`, then the workspace file
/// under `workspace_root`, then the user file. Returns `None` when nothing
/// exists, meaning the built-in configuration applies.
pub fn discover(explicit: Option<PathBuf>, workspace_root: impl AsRef<Path>) -> Option<FileConfigProvider> {
    let explicit = explicit.or_else(|| {
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    });
    if let Some(path) = explicit {
        return Some(FileConfigProvider::new(path, ConfigLevel::Explicit));
    }

    [FileConfigProvider::workspace(workspace_root), FileConfigProvider::user()]
        .into_iter()
        .find(FileConfigProvider::exists)
}

/// Load the configuration picked by [`discover`], or the built-in default
pub async fn load_config(
    explicit: Option<PathBuf>,
    workspace_root: impl AsRef<Path>,
) -> ConfigResult<(ConfigFile, Option<PathBuf>)> {
    match discover(explicit, workspace_root) {
        Some(provider) => {
            let config = provider.load().await?;
            Ok((config, Some(provider.path().to_path_buf())))
        }
        None => Ok((ConfigFile::builtin(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdapterConfig, AdapterKind};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::User);

        assert!(!provider.exists());
        assert!(provider.load().await.unwrap().adapters.is_empty());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("nope.yaml"), ConfigLevel::Explicit);

        assert!(matches!(provider.load().await, Err(ConfigError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        let mut config = ConfigFile::builtin();
        config.adapters.push(AdapterConfig::new(
            "kc",
            AdapterKind::Keychain { service: Some("svc".into()) },
        ));
        provider.save(&config).unwrap();

        assert!(provider.exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("kind: keychain"));

        let fresh = FileConfigProvider::new(&path, ConfigLevel::User);
        assert_eq!(fresh.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_invalid_yaml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "adapters: [ {name: x").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::User);
        assert!(matches!(provider.load().await, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/ws");
        assert_eq!(provider.path(), Path::new("/ws/.config/poly-secret/config.yaml"));
        assert_eq!(provider.level().as_str(), "workspace");
    }

    #[tokio::test]
    async fn test_discover_prefers_explicit_then_workspace() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("explicit.yaml");
        let found = discover(Some(explicit.clone()), dir.path()).unwrap();
        assert_eq!(found.level(), ConfigLevel::Explicit);
        assert_eq!(found.path(), explicit.as_path());

        let workspace = FileConfigProvider::workspace(dir.path());
        workspace.save(&ConfigFile::default()).unwrap();
        let (config, path) = load_config(None, dir.path()).await.unwrap();
        // Only holds when POLY_SECRET_CONFIG is unset in the test environment
        if std::env::var_os(CONFIG_ENV_VAR).is_none() {
            assert_eq!(path.as_deref(), Some(workspace.path()));
            assert!(config.adapters.is_empty());
        }
    }
}
