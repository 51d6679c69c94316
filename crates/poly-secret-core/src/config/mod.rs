//! Server configuration
//!
//! - `MemoryConfigProvider`: In-memory for testing
//! - `FileConfigProvider`: YAML file-based (explicit, workspace or user level)

mod traits;
mod memory;
mod file;

pub use traits::{
    AdapterConfig, AdapterKind, ConfigError, ConfigFile, ConfigProvider, ConfigResult, ServerSettings,
    DEFAULT_ENV_PREFIX, DEFAULT_SERVER_NAME,
};
pub use memory::MemoryConfigProvider;
pub use file::{discover, load_config, ConfigLevel, FileConfigProvider, CONFIG_ENV_VAR};
