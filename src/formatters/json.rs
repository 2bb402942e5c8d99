//! JSON formatter for structured logging

use crate::core::log_context::REQUEST_ID_KEY;
use crate::core::{Formatter, LogEntry, LoggerError, Result, TimestampFormat};
use serde_json::{Map, Value};

/// Top-level keys written by the engine itself.
///
/// A caller field with one of these names is emitted as `fields.<name>`,
/// with a further `fields.` prefix for as long as that name is itself taken
/// by another caller field.
pub const RESERVED_KEYS: [&str; 6] = ["level", "timestamp", "message", "error", "caller", "stack"];

/// Formats each entry as a single-line JSON object (JSONL)
///
/// Fields are flattened into the top-level object next to `level`,
/// `timestamp` and `message`. Compatible with log aggregation tools like
/// ELK, Loki, etc.
///
/// # Example
///
/// ```
/// use structured_logger::core::{Formatter, LogEntry, LogLevel, Fields};
/// use structured_logger::formatters::JsonFormatter;
///
/// let entry = LogEntry::new(LogLevel::Info, "request completed")
///     .with_fields(Fields::new().with("status", 200));
/// let bytes = JsonFormatter::new().format(&entry).unwrap();
/// let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
/// assert_eq!(parsed["status"], 200);
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    add_caller: bool,
    add_stack: bool,
    timestamp_format: TimestampFormat,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            add_caller: false,
            add_stack: false,
            timestamp_format: TimestampFormat::Rfc3339,
        }
    }

    /// Emit `caller` (`file:line` of the log call)
    #[must_use]
    pub fn with_caller(mut self, enabled: bool) -> Self {
        self.add_caller = enabled;
        self
    }

    /// Emit `stack` for entries that carry an error
    #[must_use]
    pub fn with_stack(mut self, enabled: bool) -> Self {
        self.add_stack = enabled;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    fn to_object(&self, entry: &LogEntry) -> Result<Map<String, Value>> {
        let mut object = Map::new();

        object.insert(
            "level".to_string(),
            Value::String(entry.level.to_str().to_string()),
        );
        object.insert(
            "timestamp".to_string(),
            self.timestamp_format.to_json_value(&entry.timestamp)?,
        );
        object.insert("message".to_string(), Value::String(entry.message.clone()));

        if let Some(ref error) = entry.error {
            object.insert("error".to_string(), Value::String(error.clone()));
        }

        if self.add_caller {
            if let Some(caller) = entry.caller() {
                object.insert("caller".to_string(), Value::String(caller));
            }
        }

        if self.add_stack && entry.error.is_some() && !entry.stack.is_empty() {
            let frames = entry.stack.iter().cloned().map(Value::String).collect();
            object.insert("stack".to_string(), Value::Array(frames));
        }

        if let Some(request_id) = entry.context.request_id() {
            if !entry.fields.contains_key(REQUEST_ID_KEY) {
                object.insert(
                    REQUEST_ID_KEY.to_string(),
                    Value::String(request_id.to_string()),
                );
            }
        }

        for (key, value) in &entry.fields {
            let value = value.to_json_value().ok_or_else(|| {
                LoggerError::formatter(
                    self.name(),
                    format!("field '{}' is not a finite number", key),
                )
            })?;
            let key = if RESERVED_KEYS.contains(&key.as_str()) {
                Self::relocated_key(entry, key)
            } else {
                key.clone()
            };
            object.insert(key, value);
        }

        Ok(object)
    }

    fn relocated_key(entry: &LogEntry, key: &str) -> String {
        let mut relocated = format!("fields.{}", key);
        while entry.fields.contains_key(&relocated) {
            relocated.insert_str(0, "fields.");
        }
        relocated
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let object = self.to_object(entry)?;
        let mut bytes = serde_json::to_vec(&Value::Object(object))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "json"
    }
}
