//! Human-readable text formatter

use crate::core::log_context::REQUEST_ID_KEY;
use crate::core::{Formatter, LogEntry, Result, TimestampFormat};
use std::fmt::Write;

/// Formats entries as one human-readable line
///
/// Output format:
///
/// ```text
/// 2025-01-08T10:30:45.123Z [INFO] (server.rs:42) request completed {path=/health status=200}
/// 2025-01-08T10:30:46.001Z [ERROR] query failed {table=products} error=connection refused
///   Stack trace:
///     repo.rs:17 app::repo::load
/// ```
///
/// Caller, fields and error sections only appear when non-empty.
#[derive(Debug, Clone)]
pub struct TextFormatter {
    add_caller: bool,
    add_stack: bool,
    use_colors: bool,
    timestamp_format: TimestampFormat,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            add_caller: false,
            add_stack: false,
            use_colors: false,
            timestamp_format: TimestampFormat::Iso8601,
        }
    }

    #[must_use]
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    #[must_use]
    pub fn with_stack(mut self, enabled: bool) -> Self {
        self.add_stack = enabled;
        self
    }

    /// Colour the level tag (ANSI escapes)
    #[cfg(feature = "console")]
    #[must_use]
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.use_colors = enabled;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Escape line breaks and tabs so caller-controlled text cannot forge
    /// extra records
    fn sanitize(text: &str) -> String {
        text.replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn level_tag(&self, entry: &LogEntry) -> String {
        let tag = format!("[{}]", entry.level.to_str());
        #[cfg(feature = "console")]
        if self.use_colors {
            use colored::Colorize;
            return tag.color(entry.level.color_code()).to_string();
        }
        tag
    }

    fn render(&self, entry: &LogEntry) -> Result<String> {
        let mut line = String::with_capacity(128);

        line.push_str(&self.timestamp_format.format(&entry.timestamp)?);
        line.push(' ');
        line.push_str(&self.level_tag(entry));

        if self.add_caller {
            if let Some(caller) = entry.caller() {
                let _ = write!(line, " ({})", caller);
            }
        }

        line.push(' ');
        line.push_str(&Self::sanitize(&entry.message));

        let context_request_id = entry
            .context
            .request_id()
            .filter(|_| !entry.fields.contains_key(REQUEST_ID_KEY));

        if !entry.fields.is_empty() || context_request_id.is_some() {
            let mut pairs: Vec<String> = entry
                .fields
                .iter()
                .map(|(k, v)| {
                    format!("{}={}", Self::sanitize(k), Self::sanitize(&v.to_string()))
                })
                .collect();
            if let Some(request_id) = context_request_id {
                pairs.push(format!("{}={}", REQUEST_ID_KEY, Self::sanitize(request_id)));
            }
            let _ = write!(line, " {{{}}}", pairs.join(" "));
        }

        if let Some(ref error) = entry.error {
            let _ = write!(line, " error={}", Self::sanitize(error));
        }

        line.push('\n');

        if self.add_stack && entry.error.is_some() && !entry.stack.is_empty() {
            line.push_str("  Stack trace:\n");
            for frame in &entry.stack {
                let _ = writeln!(line, "    {}", Self::sanitize(frame));
            }
        }

        Ok(line)
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        Ok(self.render(entry)?.into_bytes())
    }

    fn name(&self) -> &str {
        "text"
    }
}
