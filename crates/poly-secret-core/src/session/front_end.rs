//! Session front-end: maps protocol requests onto the router

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::adapters::OperationDescriptor;
use crate::dispatch::{DispatchRouter, FailureKind, InvocationOutcome, InvocationRequest};

/// Serialized answer to a call
///
/// `is_error` is the discriminator; clients must not parse `payload` to tell
/// success from failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallOperationResponse {
    pub is_error: bool,
    pub payload: String,
}

impl CallOperationResponse {
    pub fn from_outcome(outcome: InvocationOutcome) -> Self {
        match outcome {
            InvocationOutcome::Success(value) => Self {
                is_error: false,
                payload: canonical_json(&value),
            },
            InvocationOutcome::Failure(failure) => {
                let payload = match failure.kind {
                    FailureKind::UnknownOperation => failure.message,
                    FailureKind::AdapterInvocationFailure | FailureKind::Timeout => {
                        format!("Error: {}", failure.message)
                    }
                };
                Self { is_error: true, payload }
            }
        }
    }
}

/// Pretty JSON with object keys sorted at every level
pub fn canonical_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    serde_json::to_string_pretty(&sorted).unwrap_or_else(|_| sorted.to_string())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Protocol-agnostic request handling shared by every transport binding
#[derive(Debug, Clone)]
pub struct SessionFrontEnd {
    router: Arc<DispatchRouter>,
}

impl SessionFrontEnd {
    pub fn new(router: Arc<DispatchRouter>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &DispatchRouter {
        &self.router
    }

    pub fn list_operations(&self) -> Vec<OperationDescriptor> {
        self.router.list_operations()
    }

    pub async fn call_operation(&self, name: &str, arguments: Value) -> CallOperationResponse {
        let outcome = self
            .router
            .invoke(InvocationRequest::new(name, arguments))
            .await;
        CallOperationResponse::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAdapter, MockMode};
    use crate::catalog::OperationCatalog;
    use crate::logging::{NoOpLogger, SharedLogger};
    use crate::registry::{AdapterHandle, AdapterRegistry};
    use serde_json::json;
    use std::time::Duration;

    async fn front_end(adapters: Vec<MockAdapter>, timeout: Option<Duration>) -> SessionFrontEnd {
        let logger: SharedLogger = Arc::new(NoOpLogger::new());
        let mut registry = AdapterRegistry::new(Arc::clone(&logger));
        registry.register_all(adapters.into_iter().map(AdapterHandle::from));
        registry.connect_all().await;
        let catalog = OperationCatalog::build(registry.connected_handles(), logger.as_ref());
        let router = DispatchRouter::new(Arc::new(catalog), logger).with_timeout(timeout);
        SessionFrontEnd::new(Arc::new(router))
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({ "b": 1, "a": { "z": true, "y": [ { "d": 0, "c": 1 } ] } });
        let expected = "{\n  \"a\": {\n    \"y\": [\n      {\n        \"c\": 1,\n        \"d\": 0\n      }\n    ],\n    \"z\": true\n  },\n  \"b\": 1\n}";
        assert_eq!(canonical_json(&value), expected);
    }

    #[test]
    fn test_canonical_json_scalars() {
        assert_eq!(canonical_json(&json!("text")), "\"text\"");
        assert_eq!(canonical_json(&json!(null)), "null");
    }

    #[tokio::test]
    async fn test_success_payload() {
        let fe = front_end(
            vec![MockAdapter::new("a").with_operation("get-secret", MockMode::Fixed(json!({ "value": "v", "key": "k" })))],
            None,
        )
        .await;

        let response = fe.call_operation("get-secret", json!({})).await;
        assert_eq!(
            response,
            CallOperationResponse {
                is_error: false,
                payload: "{\n  \"key\": \"k\",\n  \"value\": \"v\"\n}".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_payload() {
        let fe = front_end(vec![], None).await;

        let response = fe.call_operation("nonexistent", json!({})).await;
        assert!(response.is_error);
        assert_eq!(response.payload, "Unknown tool: nonexistent");
    }

    #[tokio::test]
    async fn test_adapter_failure_payload() {
        let fe = front_end(
            vec![MockAdapter::new("a").with_operation("get-secret", MockMode::Error("boom".into()))],
            None,
        )
        .await;

        let response = fe.call_operation("get-secret", json!({})).await;
        assert!(response.is_error);
        assert_eq!(response.payload, "Error: boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_payload() {
        let fe = front_end(
            vec![MockAdapter::new("a").with_operation(
                "slow",
                MockMode::Delayed { delay: Duration::from_secs(30), value: json!(null) },
            )],
            Some(Duration::from_millis(100)),
        )
        .await;

        let response = fe.call_operation("slow", json!({})).await;
        assert!(response.is_error);
        assert_eq!(response.payload, "Error: timeout");
    }

    #[tokio::test]
    async fn test_error_text_in_success_value_is_not_an_error() {
        let fe = front_end(
            vec![MockAdapter::new("a").with_operation("get-secret", MockMode::Fixed(json!("Error: not really")))],
            None,
        )
        .await;

        let response = fe.call_operation("get-secret", json!({})).await;
        assert!(!response.is_error);
    }

    #[tokio::test]
    async fn test_list_operations() {
        let fe = front_end(
            vec![
                MockAdapter::new("a").with_operation("get-secret", MockMode::Echo),
                MockAdapter::new("b").with_operation("list-secrets", MockMode::Echo),
            ],
            None,
        )
        .await;

        let names: Vec<String> = fe.list_operations().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["get-secret", "list-secrets"]);
    }
}
