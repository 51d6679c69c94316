//! In-memory configuration provider

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{ConfigFile, ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    config: RwLock<ConfigFile>,
}

impl MemoryConfigProvider {
    pub fn new(config: ConfigFile) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Replace the configuration
    pub fn set(&self, config: ConfigFile) {
        *self.config.write() = config;
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn load(&self) -> ConfigResult<ConfigFile> {
        let config = self.config.read().clone();
        config.validate()?;
        Ok(config)
    }
}
