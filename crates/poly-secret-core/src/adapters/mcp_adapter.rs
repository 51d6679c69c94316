//! Adapter that re-exports the tools of an upstream MCP server

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rmcp::model::RawContent;
use serde_json::Value;

use super::traits::{Adapter, AdapterError, AdapterResult, Operation, OperationDescriptor};
use crate::logging::SharedLogger;
use crate::mcp::{McpClient, McpEndpoint, McpTool, McpToolResult};

type ClientSlot = Arc<RwLock<Option<Arc<McpClient>>>>;

/// Proxies every tool of an upstream MCP server
///
/// The tool list is fetched once at connect time and cached; it is what
/// `operations` returns for the rest of the session. Operations look the
/// client up per call, so after `disconnect` they fail with `NotConnected`.
pub struct McpProxyAdapter {
    name: String,
    endpoint: McpEndpoint,
    client: ClientSlot,
    tools: RwLock<Vec<McpTool>>,
    logger: SharedLogger,
}

impl McpProxyAdapter {
    pub fn new(name: impl Into<String>, endpoint: McpEndpoint, logger: SharedLogger) -> Self {
        Self {
            name: name.into(),
            endpoint,
            client: Arc::new(RwLock::new(None)),
            tools: RwLock::new(Vec::new()),
            logger,
        }
    }

    pub fn endpoint(&self) -> &McpEndpoint {
        &self.endpoint
    }
}

/// Descriptor for an upstream tool, carried over verbatim
pub fn descriptor_from_tool(tool: &McpTool) -> OperationDescriptor {
    OperationDescriptor {
        name: tool.name.to_string(),
        description: tool.description.as_ref().map(|s| s.to_string()).unwrap_or_default(),
        parameter_schema: serde_json::to_value(tool.input_schema.as_ref()).unwrap_or_default(),
    }
}

/// Turn an upstream tool result into an adapter result
///
/// Upstream errors become invocation errors carrying the upstream text,
/// minus a leading `Error: ` so it is not doubled when served again.
/// Structured content wins over text; text that parses as JSON is returned
/// as JSON, anything else as a string.
pub fn value_from_result(result: McpToolResult) -> AdapterResult<Value> {
    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        let message = text.strip_prefix("Error: ").map(str::to_string).unwrap_or(text);
        return Err(AdapterError::Invocation(message));
    }
    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }
    if text.is_empty() {
        return Ok(serde_json::to_value(&result.content).unwrap_or(Value::Null));
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[async_trait]
impl Adapter for McpProxyAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> AdapterResult<()> {
        let client = McpClient::connect(&self.endpoint, Arc::clone(&self.logger)).await?;
        let tools = client.list_tools().await?;

        self.logger.info(&format!(
            "[McpProxyAdapter] '{}' connected to {} ({} tools)",
            self.name,
            self.endpoint,
            tools.len()
        ));

        *self.tools.write() = tools;
        *self.client.write() = Some(Arc::new(client));
        Ok(())
    }

    async fn disconnect(&self) -> AdapterResult<()> {
        let client = self.client.write().take();
        self.tools.write().clear();

        match client.map(Arc::try_unwrap) {
            Some(Ok(client)) => client.close().await?,
            Some(Err(_shared)) => {
                // Calls still in flight hold the session; it closes when they drop
                self.logger.debug(&format!(
                    "[McpProxyAdapter] '{}' session still referenced, dropping",
                    self.name
                ));
            }
            None => {}
        }
        Ok(())
    }

    fn operations(&self) -> Vec<Operation> {
        if self.client.read().is_none() {
            return Vec::new();
        }

        self.tools
            .read()
            .iter()
            .map(|tool| {
                let descriptor = descriptor_from_tool(tool);
                let tool_name = descriptor.name.clone();
                let adapter = self.name.clone();
                let slot = Arc::clone(&self.client);
                Operation::new(descriptor, move |args: Value| {
                    let client = slot.read().clone();
                    let tool_name = tool_name.clone();
                    let adapter = adapter.clone();
                    async move {
                        let client = client.ok_or(AdapterError::NotConnected(adapter))?;
                        value_from_result(client.call_tool(&tool_name, args).await?)
                    }
                })
            })
            .collect()
    }
}
