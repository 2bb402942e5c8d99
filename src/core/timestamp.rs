//! Timestamp formatting for log output

use super::error::{LoggerError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Timestamp rendering used by the formatters
///
/// # Examples
///
/// ```
/// use structured_logger::core::TimestampFormat;
/// use chrono::Utc;
///
/// let rendered = TimestampFormat::Rfc3339.format(&Utc::now()).unwrap();
/// assert!(rendered.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// RFC 3339 with whole seconds: `2025-01-08T10:30:45Z`
    ///
    /// Default for JSON output.
    Rfc3339,

    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    ///
    /// Default for text output.
    #[default]
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    /// # Errors
    ///
    /// Fails for a `Custom` pattern chrono cannot render.
    pub fn format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        let rendered = match self {
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(SecondsFormat::Secs, true),
            TimestampFormat::Iso8601 => datetime.to_rfc3339_opts(SecondsFormat::Millis, true),
            TimestampFormat::Iso8601Micros => {
                datetime.to_rfc3339_opts(SecondsFormat::Micros, true)
            }
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::Custom(format_str) => {
                let mut rendered = String::new();
                write!(rendered, "{}", datetime.format(format_str)).map_err(|_| {
                    LoggerError::formatter(
                        "timestamp",
                        format!("invalid timestamp pattern '{}'", format_str),
                    )
                })?;
                rendered
            }
        };
        Ok(rendered)
    }

    /// Render as a JSON value; numeric formats stay numbers
    ///
    /// # Errors
    ///
    /// Same as [`format`](TimestampFormat::format).
    pub fn to_json_value(&self, datetime: &DateTime<Utc>) -> Result<serde_json::Value> {
        match self {
            TimestampFormat::UnixMillis => Ok(serde_json::Value::Number(
                datetime.timestamp_millis().into(),
            )),
            _ => self.format(datetime).map(serde_json::Value::String),
        }
    }
}
