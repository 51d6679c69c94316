//! Backend adapters
//!
//! - `Adapter` trait: the contract the registry and router depend on
//! - `StoreAdapter`: any `SecretStore` as get/has/list/set/delete operations
//! - `McpProxyAdapter`: the tools of an upstream MCP server
//! - `MockAdapter`: configurable fake for tests
//! - `AdapterFactory`: config entry → adapter instance

mod traits;
mod store_adapter;
mod mcp_adapter;
mod mock;
mod factory;

pub use traits::{
    required_str, Adapter, AdapterError, AdapterResult, InvokeFn, Operation, OperationDescriptor,
};
pub use store_adapter::StoreAdapter;
pub use mcp_adapter::{descriptor_from_tool, value_from_result, McpProxyAdapter};
pub use crate::mcp::McpEndpoint;
pub use mock::{MockAdapter, MockMode};
pub use factory::AdapterFactory;
