//! Mock adapter for testing
//!
//! Deterministic, configurable operations without any backend. Every call is
//! counted, so tests can assert which adapter was (or was not) reached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::traits::{Adapter, AdapterError, AdapterResult, Operation, OperationDescriptor};

/// How a mock operation answers
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Return the arguments unchanged
    #[default]
    Echo,
    /// Return a fixed value
    Fixed(Value),
    /// Fail with the given message
    Error(String),
    /// Sleep, then return the value
    Delayed { delay: Duration, value: Value },
    /// Panic with the given message
    Panic(String),
}

#[derive(Debug, Default)]
struct MockCalls {
    connects: AtomicUsize,
    disconnects: AtomicUsize,
    invocations: Mutex<HashMap<String, Vec<Value>>>,
}

/// Mock backend adapter
#[derive(Debug, Clone)]
pub struct MockAdapter {
    name: String,
    operations: Vec<(OperationDescriptor, MockMode)>,
    connect_error: Option<String>,
    disconnect_error: Option<String>,
    calls: Arc<MockCalls>,
}

impl MockAdapter {
    /// Create a mock with no operations that connects successfully
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
            connect_error: None,
            disconnect_error: None,
            calls: Arc::new(MockCalls::default()),
        }
    }

    /// Declare an operation
    pub fn with_operation(mut self, name: impl Into<String>, mode: MockMode) -> Self {
        let name = name.into();
        let descriptor = OperationDescriptor::new(name.clone(), format!("Mock operation {}", name));
        self.operations.push((descriptor, mode));
        self
    }

    /// Declare an operation with a full descriptor
    pub fn with_descriptor(mut self, descriptor: OperationDescriptor, mode: MockMode) -> Self {
        self.operations.push((descriptor, mode));
        self
    }

    /// Make `connect` fail with `message`
    pub fn failing_connect(mut self, message: impl Into<String>) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    /// Make `disconnect` fail with `message`
    pub fn failing_disconnect(mut self, message: impl Into<String>) -> Self {
        self.disconnect_error = Some(message.into());
        self
    }

    /// Number of `connect` calls
    pub fn connect_calls(&self) -> usize {
        self.calls.connects.load(Ordering::SeqCst)
    }

    /// Number of `disconnect` calls
    pub fn disconnect_calls(&self) -> usize {
        self.calls.disconnects.load(Ordering::SeqCst)
    }

    /// Total operation invocations on this adapter
    pub fn invocations(&self) -> usize {
        self.calls.invocations.lock().values().map(Vec::len).sum()
    }

    /// Arguments received by one operation, in call order
    pub fn invocations_of(&self, operation: &str) -> Vec<Value> {
        self.calls
            .invocations
            .lock()
            .get(operation)
            .cloned()
            .unwrap_or_default()
    }
}

async fn answer(mode: MockMode, args: Value) -> AdapterResult<Value> {
    match mode {
        MockMode::Echo => Ok(args),
        MockMode::Fixed(value) => Ok(value),
        MockMode::Error(message) => Err(AdapterError::invocation(message)),
        MockMode::Delayed { delay, value } => {
            tokio::time::sleep(delay).await;
            Ok(value)
        }
        MockMode::Panic(message) => panic!("{}", message),
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> AdapterResult<()> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        match &self.connect_error {
            Some(message) => Err(AdapterError::ConnectionFailed(message.clone())),
            None => Ok(()),
        }
    }

    async fn disconnect(&self) -> AdapterResult<()> {
        self.calls.disconnects.fetch_add(1, Ordering::SeqCst);
        match &self.disconnect_error {
            Some(message) => Err(AdapterError::Other(message.clone())),
            None => Ok(()),
        }
    }

    fn operations(&self) -> Vec<Operation> {
        self.operations
            .iter()
            .map(|(descriptor, mode)| {
                let calls = Arc::clone(&self.calls);
                let name = descriptor.name.clone();
                let mode = mode.clone();
                Operation::new(descriptor.clone(), move |args: Value| {
                    calls
                        .invocations
                        .lock()
                        .entry(name.clone())
                        .or_default()
                        .push(args.clone());
                    answer(mode.clone(), args)
                })
            })
            .collect()
    }
}
