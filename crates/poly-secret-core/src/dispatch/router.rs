//! Dispatch router: name → owning adapter → normalized outcome

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;

use super::outcome::{FailureKind, InvocationOutcome, InvocationRequest};
use crate::adapters::OperationDescriptor;
use crate::catalog::OperationCatalog;
use crate::logging::SharedLogger;

/// Snapshot of the dispatch counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub successes: u64,
    pub unknown_operations: u64,
    pub invocation_failures: u64,
    pub timeouts: u64,
}

impl DispatchStats {
    pub fn total(&self) -> u64 {
        self.successes + self.unknown_operations + self.invocation_failures + self.timeouts
    }
}

#[derive(Debug, Default)]
struct Counters {
    successes: AtomicU64,
    unknown_operations: AtomicU64,
    invocation_failures: AtomicU64,
    timeouts: AtomicU64,
}

impl Counters {
    fn record(&self, outcome: &InvocationOutcome) {
        let counter = match outcome.failure_kind() {
            None => &self.successes,
            Some(FailureKind::UnknownOperation) => &self.unknown_operations,
            Some(FailureKind::AdapterInvocationFailure) => &self.invocation_failures,
            Some(FailureKind::Timeout) => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Routes each invocation to exactly one adapter
///
/// Holds the catalog read-only; nothing is locked while an adapter runs,
/// so concurrent invocations proceed independently.
pub struct DispatchRouter {
    catalog: Arc<OperationCatalog>,
    timeout: Option<Duration>,
    counters: Counters,
    logger: SharedLogger,
}

impl DispatchRouter {
    pub fn new(catalog: Arc<OperationCatalog>, logger: SharedLogger) -> Self {
        Self {
            catalog,
            timeout: None,
            counters: Counters::default(),
            logger,
        }
    }

    /// Bound every adapter call; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    /// Advertised descriptors, in catalog order
    pub fn list_operations(&self) -> Vec<OperationDescriptor> {
        self.catalog
            .entries()
            .iter()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    /// Dispatch one request
    pub async fn invoke(&self, request: InvocationRequest) -> InvocationOutcome {
        let outcome = self.dispatch(request).await;
        self.counters.record(&outcome);
        outcome
    }

    async fn dispatch(&self, request: InvocationRequest) -> InvocationOutcome {
        let InvocationRequest { operation_name, arguments } = request;

        let Some(entry) = self.catalog.get(&operation_name) else {
            self.logger.warn(&format!("[DispatchRouter] Unknown tool: {}", operation_name));
            return InvocationOutcome::unknown_operation(&operation_name);
        };

        self.logger.debug(&format!(
            "[DispatchRouter] Calling '{}' on '{}'",
            operation_name, entry.adapter
        ));

        let invoke = Arc::clone(&entry.invoke);
        let call = AssertUnwindSafe(async move { invoke(arguments).await }).catch_unwind();

        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    self.logger.warn(&format!(
                        "[DispatchRouter] '{}' on '{}' timed out after {:?}",
                        operation_name, entry.adapter, limit
                    ));
                    return InvocationOutcome::timeout();
                }
            },
            None => call.await,
        };

        match result {
            Ok(Ok(value)) => InvocationOutcome::Success(value),
            Ok(Err(e)) => {
                let message = e.to_string();
                self.logger.warn(&format!(
                    "[DispatchRouter] '{}' on '{}' failed: {}",
                    operation_name, entry.adapter, message
                ));
                InvocationOutcome::failure(FailureKind::AdapterInvocationFailure, message)
            }
            Err(panic) => {
                let message = panic_message(&*panic);
                self.logger.error(&format!(
                    "[DispatchRouter] '{}' on '{}' panicked: {}",
                    operation_name, entry.adapter, message
                ));
                InvocationOutcome::failure(FailureKind::AdapterInvocationFailure, message)
            }
        }
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            successes: self.counters.successes.load(Ordering::Relaxed),
            unknown_operations: self.counters.unknown_operations.load(Ordering::Relaxed),
            invocation_failures: self.counters.invocation_failures.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("adapter panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("adapter panicked: {}", s)
    } else {
        "adapter panicked".to_string()
    }
}

impl std::fmt::Debug for DispatchRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRouter")
            .field("operations", &self.catalog.len())
            .field("timeout", &self.timeout)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAdapter, MockMode};
    use crate::dispatch::InvocationFailure;
    use crate::logging::NoOpLogger;
    use crate::registry::{AdapterHandle, AdapterRegistry};
    use serde_json::json;

    async fn router_for(adapters: Vec<MockAdapter>) -> DispatchRouter {
        let logger: SharedLogger = Arc::new(NoOpLogger::new());
        let mut registry = AdapterRegistry::new(Arc::clone(&logger));
        registry.register_all(adapters.into_iter().map(AdapterHandle::from));
        registry.connect_all().await;
        let catalog = OperationCatalog::build(registry.connected_handles(), logger.as_ref());
        DispatchRouter::new(Arc::new(catalog), logger)
    }

    #[tokio::test]
    async fn test_unknown_operation_touches_no_adapter() {
        let a = MockAdapter::new("a").with_operation("get-secret", MockMode::Echo);
        let router = router_for(vec![a.clone()]).await;

        let outcome = router.invoke(InvocationRequest::new("nonexistent", json!({}))).await;

        assert_eq!(
            outcome,
            InvocationOutcome::Failure(InvocationFailure {
                kind: FailureKind::UnknownOperation,
                message: "Unknown tool: nonexistent".into(),
            })
        );
        assert_eq!(a.invocations(), 0);
    }

    #[tokio::test]
    async fn test_success_passthrough() {
        let value = json!({ "value": "s3cr3t", "nested": [1, 2, { "k": null }] });
        let router = router_for(vec![
            MockAdapter::new("a").with_operation("get-secret", MockMode::Fixed(value.clone()))
        ])
        .await;

        let outcome = router.invoke(InvocationRequest::new("get-secret", json!({ "key": "x" }))).await;
        assert_eq!(outcome, InvocationOutcome::Success(value));
    }

    #[tokio::test]
    async fn test_arguments_forwarded_unchanged() {
        let a = MockAdapter::new("a").with_operation("get-secret", MockMode::Echo);
        let router = router_for(vec![a.clone()]).await;

        router.invoke(InvocationRequest::new("get-secret", json!({ "key": "db" }))).await;

        assert_eq!(a.invocations_of("get-secret"), vec![json!({ "key": "db" })]);
    }

    #[tokio::test]
    async fn test_adapter_error_becomes_failure() {
        let router = router_for(vec![
            MockAdapter::new("a").with_operation("get-secret", MockMode::Error("boom".into()))
        ])
        .await;

        let outcome = router.invoke(InvocationRequest::new("get-secret", json!({}))).await;

        match outcome {
            InvocationOutcome::Failure(failure) => {
                assert_eq!(failure.kind, FailureKind::AdapterInvocationFailure);
                assert!(failure.message.contains("boom"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panicking_adapter_is_contained() {
        let router = router_for(vec![
            MockAdapter::new("a")
                .with_operation("explode", MockMode::Panic("kaboom".into()))
                .with_operation("ok", MockMode::Fixed(json!(true))),
        ])
        .await;

        let outcome = router.invoke(InvocationRequest::new("explode", json!({}))).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::AdapterInvocationFailure));
        if let InvocationOutcome::Failure(failure) = outcome {
            assert!(failure.message.contains("kaboom"));
        }

        // Router keeps serving
        let outcome = router.invoke(InvocationRequest::new("ok", json!({}))).await;
        assert_eq!(outcome, InvocationOutcome::Success(json!(true)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let router = router_for(vec![MockAdapter::new("a").with_operation(
            "slow",
            MockMode::Delayed { delay: Duration::from_secs(60), value: json!(1) },
        )])
        .await
        .with_timeout(Some(Duration::from_secs(1)));

        let outcome = router.invoke(InvocationRequest::new("slow", json!({}))).await;
        assert_eq!(outcome, InvocationOutcome::timeout());
        assert_eq!(router.stats().timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_within_timeout_succeeds() {
        let router = router_for(vec![MockAdapter::new("a").with_operation(
            "slow",
            MockMode::Delayed { delay: Duration::from_millis(10), value: json!("done") },
        )])
        .await
        .with_timeout(Some(Duration::from_secs(1)));

        let outcome = router.invoke(InvocationRequest::new("slow", json!({}))).await;
        assert_eq!(outcome, InvocationOutcome::Success(json!("done")));
    }

    #[tokio::test]
    async fn test_exactly_one_adapter_per_request() {
        let a = MockAdapter::new("a").with_operation("X", MockMode::Error("down".into()));
        let b = MockAdapter::new("b").with_operation("X", MockMode::Fixed(json!("b")));
        let router = router_for(vec![a.clone(), b.clone()]).await;

        let outcome = router.invoke(InvocationRequest::new("X", json!({}))).await;

        // No fallback to b
        assert_eq!(outcome.failure_kind(), Some(FailureKind::AdapterInvocationFailure));
        assert_eq!(a.invocations(), 1);
        assert_eq!(b.invocations(), 0);
    }

    #[tokio::test]
    async fn test_list_operations_is_idempotent() {
        let router = router_for(vec![
            MockAdapter::new("a").with_operation("get-secret", MockMode::Echo),
            MockAdapter::new("b").with_operation("list-secrets", MockMode::Echo),
        ])
        .await;

        let first = router.list_operations();
        let second = router.list_operations();
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["get-secret", "list-secrets"]);
    }

    #[tokio::test]
    async fn test_concurrent_invocations() {
        let a = MockAdapter::new("a").with_operation("echo", MockMode::Echo);
        let router = Arc::new(router_for(vec![a.clone()]).await);

        let calls = (0..8).map(|i| {
            let router = Arc::clone(&router);
            async move { router.invoke(InvocationRequest::new("echo", json!({ "i": i }))).await }
        });
        let outcomes = futures::future::join_all(calls).await;

        for (i, outcome) in outcomes.into_iter().enumerate() {
            assert_eq!(outcome, InvocationOutcome::Success(json!({ "i": i })));
        }
        assert_eq!(a.invocations(), 8);
    }

    #[tokio::test]
    async fn test_stats() {
        let router = router_for(vec![
            MockAdapter::new("a")
                .with_operation("ok", MockMode::Echo)
                .with_operation("bad", MockMode::Error("no".into())),
        ])
        .await;

        router.invoke(InvocationRequest::new("ok", json!({}))).await;
        router.invoke(InvocationRequest::new("ok", json!({}))).await;
        router.invoke(InvocationRequest::new("bad", json!({}))).await;
        router.invoke(InvocationRequest::new("missing", json!({}))).await;

        assert_eq!(
            router.stats(),
            DispatchStats {
                successes: 2,
                unknown_operations: 1,
                invocation_failures: 1,
                timeouts: 0,
            }
        );
        assert_eq!(router.stats().total(), 4);
    }
}
