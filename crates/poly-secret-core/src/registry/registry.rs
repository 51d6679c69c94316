//! Adapter registry: owns the configured handles and drives their lifecycle

use futures::future::join_all;

use super::handle::{AdapterHandle, ConnectionState};
use crate::logging::SharedLogger;

/// A per-adapter failure collected during connect or disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterFailure {
    pub adapter: String,
    pub message: String,
}

/// Result of a connect phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectReport {
    /// Identities that connected, in registration order
    pub connected: Vec<String>,
    /// Adapters that failed, in registration order
    pub failed: Vec<AdapterFailure>,
}

/// Holds the configured adapter handles
///
/// Registration order is significant: it is the order of `connected_handles`
/// and therefore decides operation name collisions in the catalog.
pub struct AdapterRegistry {
    handles: Vec<AdapterHandle>,
    logger: SharedLogger,
}

impl AdapterRegistry {
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            handles: Vec::new(),
            logger,
        }
    }

    /// Store handles, preserving input order after any already registered
    pub fn register_all(&mut self, handles: impl IntoIterator<Item = AdapterHandle>) {
        for handle in handles {
            self.logger.debug(&format!("[AdapterRegistry] Registered adapter '{}'", handle.identity()));
            self.handles.push(handle);
        }
    }

    /// Connect every disconnected handle
    ///
    /// Connects run concurrently and each failure is isolated: the handle is
    /// marked `Failed`, logged, and excluded from the catalog. Handles already
    /// connected or failed are left alone, so this never retries.
    pub async fn connect_all(&mut self) -> ConnectReport {
        let pending: Vec<usize> = self
            .handles
            .iter()
            .enumerate()
            .filter(|(_, h)| h.state() == ConnectionState::Disconnected)
            .map(|(i, _)| i)
            .collect();

        let attempts = pending.iter().map(|&i| {
            let adapter = self.handles[i].adapter();
            async move { adapter.connect().await }
        });
        let results = join_all(attempts).await;

        let mut report = ConnectReport::default();
        for (i, result) in pending.into_iter().zip(results) {
            let handle = &mut self.handles[i];
            match result {
                Ok(()) => {
                    handle.mark_connected();
                    self.logger.info(&format!(
                        "[AdapterRegistry] Connected '{}' ({} operations)",
                        handle.identity(),
                        handle.operations().len()
                    ));
                    report.connected.push(handle.identity().to_string());
                }
                Err(e) => {
                    let message = e.to_string();
                    self.logger.error(&format!(
                        "[AdapterRegistry] Failed to connect '{}': {}",
                        handle.identity(),
                        message
                    ));
                    report.failed.push(AdapterFailure {
                        adapter: handle.identity().to_string(),
                        message: message.clone(),
                    });
                    handle.mark_failed(message);
                }
            }
        }
        report
    }

    /// Connected handles, in registration order
    pub fn connected_handles(&self) -> Vec<&AdapterHandle> {
        self.handles.iter().filter(|h| h.is_connected()).collect()
    }

    /// Disconnect every connected handle, best effort
    ///
    /// Every connected handle gets a disconnect attempt regardless of the
    /// others. Failures are logged and returned, never propagated. A second
    /// call finds nothing connected and does nothing.
    pub async fn disconnect_all(&mut self) -> Vec<AdapterFailure> {
        let connected: Vec<usize> = self
            .handles
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_connected())
            .map(|(i, _)| i)
            .collect();

        let attempts = connected.iter().map(|&i| {
            let adapter = self.handles[i].adapter();
            async move { adapter.disconnect().await }
        });
        let results = join_all(attempts).await;

        let mut failures = Vec::new();
        for (i, result) in connected.into_iter().zip(results) {
            let handle = &mut self.handles[i];
            match result {
                Ok(()) => {
                    self.logger.debug(&format!("[AdapterRegistry] Disconnected '{}'", handle.identity()));
                    handle.mark_disconnected(None);
                }
                Err(e) => {
                    let message = e.to_string();
                    self.logger.warn(&format!(
                        "[AdapterRegistry] Failed to disconnect '{}': {}",
                        handle.identity(),
                        message
                    ));
                    failures.push(AdapterFailure {
                        adapter: handle.identity().to_string(),
                        message: message.clone(),
                    });
                    handle.mark_disconnected(Some(message));
                }
            }
        }
        failures
    }

    /// Look up a handle by identity
    pub fn handle(&self, identity: &str) -> Option<&AdapterHandle> {
        self.handles.iter().find(|h| h.identity() == identity)
    }

    /// Every handle with its state, in registration order
    pub fn states(&self) -> Vec<(String, ConnectionState)> {
        self.handles
            .iter()
            .map(|h| (h.identity().to_string(), h.state()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("handles", &self.handles)
            .finish()
    }
}
