//! Fan-out logger

use super::traits::{LogLevel, Logger, SharedLogger};

/// Forwards every message to each inner logger
pub struct TeeLogger {
    sinks: Vec<SharedLogger>,
}

impl TeeLogger {
    pub fn new(sinks: Vec<SharedLogger>) -> Self {
        Self { sinks }
    }
}

impl Logger for TeeLogger {
    fn log(&self, level: LogLevel, message: &str) {
        for sink in &self.sinks {
            sink.log(level, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLogger;
    use std::sync::Arc;

    #[test]
    fn test_tee_forwards_to_all() {
        let a = Arc::new(MemoryLogger::new());
        let b = Arc::new(MemoryLogger::new());
        let tee = TeeLogger::new(vec![a.clone(), b.clone()]);

        tee.warn("careful");

        assert_eq!(a.messages_at(LogLevel::Warn), vec!["careful".to_string()]);
        assert_eq!(b.entries().len(), 1);
    }
}
