//! Log entry structure

use super::fields::Fields;
use super::log_context::LogContext;
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::Write;

/// One log event.
///
/// Built once per log call by the [`Logger`](crate::Logger) and handed to its
/// handler by reference, so every sink sees the same immutable value.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    /// Event creation time (not formatting time)
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub fields: Fields,
    /// Rendered underlying error, including its source chain
    pub error: Option<String>,
    /// File name (without directories) of the originating call
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Captured `file:line function` frames, innermost first
    pub stack: Vec<String>,
    pub context: LogContext,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            message: message.into(),
            fields: Fields::new(),
            error: None,
            file: None,
            line: None,
            stack: Vec::new(),
            context: LogContext::default(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: &(dyn Error + 'static)) -> Self {
        self.error = Some(describe_error(error));
        self
    }

    #[must_use]
    pub fn with_error_message(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Record the call site; only the file name is kept, not its directories
    #[must_use]
    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
        self.file = Some(base.to_string());
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_stack(mut self, stack: Vec<String>) -> Self {
        self.stack = stack;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: LogContext) -> Self {
        self.context = context;
        self
    }

    /// `file:line` of the originating call, if recorded
    pub fn caller(&self) -> Option<String> {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => Some(format!("{}:{}", file, line)),
            (Some(file), None) => Some(file.clone()),
            _ => None,
        }
    }
}

/// Render an error and its `source()` chain as `outer: inner: root`.
pub fn describe_error(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(rendered, ": {}", cause);
        source = cause.source();
    }
    rendered
}
