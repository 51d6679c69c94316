//! stderr logger

use super::traits::{LogLevel, Logger};

/// Writes `<prefix> <LEVEL>: <message>` lines to stderr
///
/// stdout carries the MCP stream, so nothing is ever printed there.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// `[poly-secret]` prefix, level taken from `POLY_SECRET_LOG_LEVEL`
    pub fn new() -> Self {
        Self::with_prefix("[poly-secret]")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            min_level: LogLevel::from_env(LogLevel::Info),
        }
    }

    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn line(&self, level: LogLevel, message: &str) -> Option<String> {
        (level >= self.min_level).then(|| format!("{} {}: {}", self.prefix, level, message))
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if let Some(line) = self.line(level, message) {
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_format() {
        let logger = ConsoleLogger::with_prefix("[psm]").with_min_level(LogLevel::Debug);
        assert_eq!(
            logger.line(LogLevel::Warn, "[AdapterRegistry] down").as_deref(),
            Some(format!("[psm] {}: [AdapterRegistry] down", LogLevel::Warn).as_str())
        );
    }

    #[test]
    fn test_below_min_level_is_dropped() {
        let logger = ConsoleLogger::new().with_min_level(LogLevel::Warn);
        assert!(logger.line(LogLevel::Info, "quiet").is_none());
        assert!(logger.line(LogLevel::Warn, "loud").is_some());
        assert!(logger.line(LogLevel::Error, "louder").is_some());
    }
}
