//! Upstream MCP client
//!
//! Lets the `mcp` adapter kind re-export the tools of a secret manager that
//! already speaks MCP, over streamable HTTP or a Unix socket.
//!
//! ```rust,ignore
//! use poly_secret_core::mcp::{McpClient, McpEndpoint};
//!
//! let endpoint = McpEndpoint::Http("http://127.0.0.1:8200/mcp".into());
//! let client = McpClient::connect(&endpoint, logger).await?;
//! let tools = client.list_tools().await?;
//! ```

mod client;

pub use client::{McpClient, McpEndpoint, McpError, McpResult};

pub use rmcp::model::{CallToolResult as McpToolResult, Tool as McpTool};
