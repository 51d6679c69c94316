//! Adapter registry
//!
//! Owns the configured adapter handles and drives the connect/disconnect
//! lifecycle with per-adapter fault isolation.

mod handle;
#[allow(clippy::module_inception)]
mod registry;

pub use handle::{AdapterHandle, ConnectionState};
pub use registry::{AdapterFailure, AdapterRegistry, ConnectReport};
