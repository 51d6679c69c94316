//! Secret storage backends wrapped by the store adapters
//!
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `EnvSecretStore`, `MemorySecretStore`, `KeychainSecretStore`

mod traits;
mod env_store;
mod memory_store;
mod keychain_store;

pub use traits::{SecretStore, SecretInfo, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use keychain_store::KeychainSecretStore;
