//! Adapter handle: one adapter plus its lifecycle state

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::adapters::{Adapter, Operation};

/// Lifecycle state of an adapter handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// Connect failed; never retried within the session
    Failed,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Failed => "failed",
        }
    }
}

/// Owned wrapper around a configured adapter
///
/// `operations` is only populated while the handle is `Connected`.
pub struct AdapterHandle {
    identity: String,
    adapter: Arc<dyn Adapter>,
    state: ConnectionState,
    operations: Vec<Operation>,
    last_error: Option<String>,
}

impl AdapterHandle {
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self {
            identity: adapter.name().to_string(),
            adapter,
            state: ConnectionState::Disconnected,
            operations: Vec::new(),
            last_error: None,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Operations in declaration order (empty unless connected)
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Message of the last connect or disconnect failure
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn adapter(&self) -> Arc<dyn Adapter> {
        Arc::clone(&self.adapter)
    }

    pub(crate) fn mark_connected(&mut self) {
        self.operations = self.adapter.operations();
        self.state = ConnectionState::Connected;
        self.last_error = None;
    }

    pub(crate) fn mark_failed(&mut self, error: String) {
        self.operations.clear();
        self.state = ConnectionState::Failed;
        self.last_error = Some(error);
    }

    pub(crate) fn mark_disconnected(&mut self, error: Option<String>) {
        self.operations.clear();
        self.state = ConnectionState::Disconnected;
        if error.is_some() {
            self.last_error = error;
        }
    }
}

impl<A: Adapter + 'static> From<A> for AdapterHandle {
    fn from(adapter: A) -> Self {
        Self::new(Arc::new(adapter))
    }
}

impl std::fmt::Debug for AdapterHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterHandle")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("operations", &self.operations.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}
