//! Client session with one upstream MCP server (rmcp)

use std::path::PathBuf;

use rmcp::model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, Tool};
use rmcp::service::RunningService;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::logging::SharedLogger;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    #[error("Upstream call to '{tool}' failed: {message}")]
    Call { tool: String, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unsupported endpoint: {0}")]
    Unsupported(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// Where an upstream server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpEndpoint {
    /// Streamable HTTP endpoint URL
    Http(String),
    /// Unix domain socket path
    Unix(PathBuf),
}

impl std::fmt::Display for McpEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            McpEndpoint::Http(url) => write!(f, "{}", url),
            McpEndpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "poly-secret-mcp".to_string(),
            title: Some("poly-secret-mcp upstream client".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
    }
}

/// An initialized upstream session
pub struct McpClient {
    session: RunningService<RoleClient, ClientInfo>,
    endpoint: String,
    logger: SharedLogger,
}

impl McpClient {
    /// Open the endpoint and run the initialize handshake
    pub async fn connect(endpoint: &McpEndpoint, logger: SharedLogger) -> McpResult<Self> {
        logger.debug(&format!("[McpClient] Connecting to {}", endpoint));
        match endpoint {
            McpEndpoint::Http(url) => {
                let transport = StreamableHttpClientTransport::from_uri(url.clone());
                let session = client_info()
                    .serve(transport)
                    .await
                    .map_err(|e| McpError::Handshake(e.to_string()))?;
                Ok(Self::ready(session, endpoint.to_string(), logger))
            }
            #[cfg(unix)]
            McpEndpoint::Unix(path) => {
                let stream = tokio::net::UnixStream::connect(path)
                    .await
                    .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", path.display(), e)))?;
                Self::connect_stream(stream, endpoint.to_string(), logger).await
            }
            #[cfg(not(unix))]
            McpEndpoint::Unix(_) => Err(McpError::Unsupported(endpoint.to_string())),
        }
    }

    /// Run the handshake over an already-open byte stream
    pub async fn connect_stream<S>(stream: S, label: impl Into<String>, logger: SharedLogger) -> McpResult<Self>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let session = client_info()
            .serve(stream)
            .await
            .map_err(|e| McpError::Handshake(e.to_string()))?;
        Ok(Self::ready(session, label.into(), logger))
    }

    fn ready(session: RunningService<RoleClient, ClientInfo>, endpoint: String, logger: SharedLogger) -> Self {
        let server = session
            .peer_info()
            .map(|info| format!("{} {}", info.server_info.name, info.server_info.version))
            .unwrap_or_else(|| "unknown server".to_string());
        logger.info(&format!("[McpClient] Initialized with {} at {}", server, endpoint));
        Self { session, endpoint, logger }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Every tool the upstream lists, across pages
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let tools = self
            .session
            .list_all_tools()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        self.logger.debug(&format!("[McpClient] {} lists {} tools", self.endpoint, tools.len()));
        Ok(tools)
    }

    /// Call one tool; non-object arguments are sent as no arguments
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };
        self.session.call_tool(params).await.map_err(|e| McpError::Call {
            tool: name.to_string(),
            message: e.to_string(),
        })
    }

    /// Upstream implementation info from the handshake
    pub fn server_info(&self) -> Option<&Implementation> {
        self.session.peer_info().map(|info| &info.server_info)
    }

    pub async fn close(self) -> McpResult<()> {
        self.logger.debug(&format!("[McpClient] Closing {}", self.endpoint));
        self.session
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient").field("endpoint", &self.endpoint).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        assert_eq!(McpEndpoint::Http("http://x/mcp".into()).to_string(), "http://x/mcp");
        assert_eq!(McpEndpoint::Unix(PathBuf::from("/tmp/s.sock")).to_string(), "unix:/tmp/s.sock");
    }

    #[test]
    fn test_call_error_names_tool() {
        let err = McpError::Call { tool: "read_secret".into(), message: "closed".into() };
        assert_eq!(err.to_string(), "Upstream call to 'read_secret' failed: closed");
    }
}
