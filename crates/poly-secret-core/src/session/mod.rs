//! Session front-end and its MCP binding

mod front_end;
mod mcp_server;

pub use front_end::{canonical_json, CallOperationResponse, SessionFrontEnd};
pub use mcp_server::{call_tool_result, tool_from_descriptor, PolySecretServer};
