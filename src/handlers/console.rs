//! Console handler implementation

use crate::core::{Formatter, Handler, LogEntry, LoggerError, Result};
use crate::formatters::{JsonFormatter, TextFormatter};
use parking_lot::Mutex;
use std::io::Write;

/// Standard stream a [`ConsoleHandler`] writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
        }
    }

    fn open(&self) -> Box<dyn Write + Send> {
        match self {
            ConsoleTarget::Stdout => Box::new(std::io::stdout()),
            ConsoleTarget::Stderr => Box::new(std::io::stderr()),
        }
    }
}

/// Writes formatted entries to a console stream
///
/// The stream is chosen once at construction. Formatting happens outside the
/// lock; the write of one entry is a single `write_all` under the lock, so
/// lines from concurrent callers never interleave.
///
/// # Example
///
/// ```
/// use structured_logger::handlers::{ConsoleHandler, ConsoleTarget};
/// use structured_logger::formatters::TextFormatter;
///
/// let handler = ConsoleHandler::new(ConsoleTarget::Stderr, Box::new(TextFormatter::new()));
/// ```
pub struct ConsoleHandler {
    name: String,
    formatter: Box<dyn Formatter>,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleHandler {
    pub fn new(target: ConsoleTarget, formatter: Box<dyn Formatter>) -> Self {
        Self {
            name: format!("console:{}", target.as_str()),
            formatter,
            writer: Mutex::new(target.open()),
        }
    }

    /// JSON lines on stdout
    pub fn stdout() -> Self {
        Self::new(ConsoleTarget::Stdout, Box::new(JsonFormatter::new()))
    }

    /// Human-readable lines on stderr, as used by the logger's fallback path
    pub fn stderr_text() -> Self {
        Self::new(ConsoleTarget::Stderr, Box::new(TextFormatter::new()))
    }

    /// Write to an arbitrary sink instead of a standard stream
    ///
    /// Mostly useful for capturing output in tests.
    pub fn with_writer(writer: Box<dyn Write + Send>, formatter: Box<dyn Formatter>) -> Self {
        Self {
            name: "console:writer".to_string(),
            formatter,
            writer: Mutex::new(writer),
        }
    }
}

impl Handler for ConsoleHandler {
    fn handle(&self, entry: &LogEntry) -> Result<()> {
        let bytes = self.formatter.format(entry)?;

        let mut writer = self.writer.lock();
        writer
            .write_all(&bytes)
            .and_then(|_| writer.flush())
            .map_err(|e| LoggerError::io_operation("write log entry", self.name.clone(), e))
    }

    /// The stream belongs to the process; only flush it
    fn close(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
