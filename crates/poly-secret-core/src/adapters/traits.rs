//! Adapter contract consumed by the registry and the router

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::McpError;
use crate::secrets::SecretStoreError;

/// Errors raised by adapters, at connect time or per invocation
#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Adapter not connected: {0}")]
    NotConnected(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Invocation(String),

    #[error(transparent)]
    Store(#[from] SecretStoreError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error("{0}")]
    Other(String),
}

impl AdapterError {
    /// Create an invocation error
    pub fn invocation(message: impl Into<String>) -> Self {
        Self::Invocation(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Describes one invokable operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Operation name, unique within a catalog
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for the accepted arguments
    #[serde(rename = "inputSchema")]
    pub parameter_schema: Value,
}

impl OperationDescriptor {
    /// Create a descriptor taking no arguments
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameter_schema: json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the parameter schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.parameter_schema = schema;
        self
    }

    /// Object schema where every listed parameter is a required string
    pub fn with_string_params(self, params: &[(&str, &str)]) -> Self {
        let mut properties = serde_json::Map::new();
        for (name, description) in params {
            properties.insert(
                (*name).to_string(),
                json!({ "type": "string", "description": description }),
            );
        }
        let required: Vec<&str> = params.iter().map(|(name, _)| *name).collect();
        self.with_schema(json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }))
    }
}

/// Invocation function bound to an operation
pub type InvokeFn = Arc<dyn Fn(Value) -> BoxFuture<'static, AdapterResult<Value>> + Send + Sync>;

/// A descriptor bound to the function that serves it
#[derive(Clone)]
pub struct Operation {
    pub descriptor: OperationDescriptor,
    pub invoke: InvokeFn,
}

impl Operation {
    /// Bind an async function to a descriptor
    pub fn new<F, Fut>(descriptor: OperationDescriptor, handler: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AdapterResult<Value>> + Send + 'static,
    {
        Self {
            descriptor,
            invoke: Arc::new(move |args| handler(args).boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// A backend adapter: one secret-management system behind a fixed contract
///
/// The registry calls `connect` once, reads `operations` only after a
/// successful connect, and calls `disconnect` at shutdown.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Identity of this adapter (unique per configuration)
    fn name(&self) -> &str;

    /// Establish the backend connection
    async fn connect(&self) -> AdapterResult<()>;

    /// Tear down the backend connection. Failures are logged, never surfaced.
    async fn disconnect(&self) -> AdapterResult<()>;

    /// Operations in declaration order
    fn operations(&self) -> Vec<Operation>;
}

/// Pull a required string argument out of an argument object
pub fn required_str<'a>(args: &'a Value, key: &str) -> AdapterResult<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::invalid_arguments(format!("missing string argument '{}'", key)))
}
