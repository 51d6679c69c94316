//! Invocation request and outcome types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub operation_name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl InvocationRequest {
    pub fn new(operation_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            operation_name: operation_name.into(),
            arguments,
        }
    }
}

/// Why an invocation did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No catalog entry for the name; no adapter was called
    UnknownOperation,
    /// The adapter returned an error or panicked
    AdapterInvocationFailure,
    /// The adapter did not answer within the configured bound
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl std::fmt::Display for InvocationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Normalized result of a dispatched call
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Success(Value),
    Failure(InvocationFailure),
}

impl InvocationOutcome {
    pub fn unknown_operation(name: &str) -> Self {
        Self::failure(FailureKind::UnknownOperation, format!("Unknown tool: {}", name))
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure(InvocationFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn timeout() -> Self {
        Self::failure(FailureKind::Timeout, "timeout")
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure.kind),
        }
    }
}
