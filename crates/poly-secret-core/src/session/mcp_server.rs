//! MCP binding of the session front-end
//!
//! Operations are only known after the connect phase, so the handler is
//! written by hand instead of with the `#[tool_router]` macros.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::{json, Value};

use super::front_end::{CallOperationResponse, SessionFrontEnd};
use crate::adapters::OperationDescriptor;
use crate::logging::SharedLogger;

/// Convert a descriptor into an MCP tool
///
/// MCP requires an object schema. An object missing `"type"` gets
/// `"type": "object"` added; anything else is replaced with an empty schema.
pub fn tool_from_descriptor(descriptor: &OperationDescriptor) -> Tool {
    let schema: JsonObject = match &descriptor.parameter_schema {
        Value::Object(map) if map.get("type").and_then(Value::as_str) == Some("object") => map.clone(),
        Value::Object(map) if !map.contains_key("type") => {
            let mut map = map.clone();
            map.insert("type".to_string(), json!("object"));
            map
        }
        _ => match json!({ "type": "object", "properties": {} }) {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        },
    };
    Tool::new(descriptor.name.clone(), descriptor.description.clone(), Arc::new(schema))
}

/// One text item, flagged with `is_error`
pub fn call_tool_result(response: CallOperationResponse) -> CallToolResult {
    let content = vec![Content::text(response.payload)];
    if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

/// `ServerHandler` serving the catalog over MCP
#[derive(Clone)]
pub struct PolySecretServer {
    front_end: SessionFrontEnd,
    name: String,
    logger: SharedLogger,
}

impl PolySecretServer {
    pub fn new(front_end: SessionFrontEnd, name: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            front_end,
            name: name.into(),
            logger,
        }
    }

    pub fn front_end(&self) -> &SessionFrontEnd {
        &self.front_end
    }

    /// Current catalog as MCP tools
    pub fn tools(&self) -> Vec<Tool> {
        self.front_end
            .list_operations()
            .iter()
            .map(tool_from_descriptor)
            .collect()
    }

    /// Dispatch a `tools/call` request
    pub async fn handle_call(&self, request: CallToolRequestParams) -> CallToolResult {
        let arguments = request.arguments.map(Value::Object).unwrap_or_else(|| json!({}));
        let response = self.front_end.call_operation(&request.name, arguments).await;
        if response.is_error {
            self.logger.debug(&format!("[PolySecretServer] tools/call '{}' failed", request.name));
        }
        call_tool_result(response)
    }
}

impl ServerHandler for PolySecretServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            protocol_version: ProtocolVersion::LATEST,
            server_info: Implementation {
                name: self.name.clone(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Poly Secret MCP".to_string()),
                ..Default::default()
            },
            instructions: Some(
                "Unified secrets server. Each tool belongs to one configured backend; \
                 call tools/list to see what is available in this session."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.handle_call(request).await)
    }
}

impl std::fmt::Debug for PolySecretServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolySecretServer")
            .field("name", &self.name)
            .field("front_end", &self.front_end)
            .finish()
    }
}
