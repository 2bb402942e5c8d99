//! Formatter implementations
//!
//! - [`JsonFormatter`]: one single-line JSON object per entry
//! - [`TextFormatter`]: human-readable single line, stack frames below it

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

// Re-export the trait alongside its implementations
pub use crate::core::Formatter;

use std::fmt;
use std::str::FromStr;

/// Output format selected by configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Machine-readable JSON (default)
    ///
    /// Example: `{"level":"INFO","message":"Request processed","timestamp":"2025-01-08T10:30:45Z"}`
    #[default]
    Json,

    /// Human-readable text
    ///
    /// Example: `2025-01-08T10:30:45.123Z [INFO] Request processed {status=200}`
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }

    /// Parse a format name, falling back to JSON for anything unrecognized
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Build the formatter for this format
    pub fn build(&self, add_caller: bool, add_stack: bool) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Json => Box::new(
                JsonFormatter::new()
                    .with_caller(add_caller)
                    .with_stack(add_stack),
            ),
            OutputFormat::Text => Box::new(
                TextFormatter::new()
                    .with_caller(add_caller)
                    .with_stack(add_stack),
            ),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            _ => Err(format!("Invalid output format: '{}'", s)),
        }
    }
}
