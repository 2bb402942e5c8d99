//! Logger configuration
//!
//! Every value has a documented default and invalid values fall back to
//! those defaults instead of failing. The only setup error is a log
//! directory that cannot be created.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use crate::formatters::OutputFormat;
use crate::handlers::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    Stdout,
    Stderr,
    File,
}

impl OutputTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputTarget::Stdout => "stdout",
            OutputTarget::Stderr => "stderr",
            OutputTarget::File => "file",
        }
    }

    /// Parse, falling back to `Stdout` for anything unrecognised
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(OutputTarget::Stdout),
            "stderr" => Ok(OutputTarget::Stderr),
            "file" => Ok(OutputTarget::File),
            _ => Err(format!("Invalid output target: {}", s)),
        }
    }
}

/// Configuration consumed by [`Logger::from_config`](crate::Logger::from_config)
///
/// Deserializable from any serde format; missing keys take their defaults.
///
/// # Example
///
/// ```
/// use structured_logger::{LoggerConfig, LogLevel};
///
/// let config: LoggerConfig =
///     serde_json::from_str(r#"{"level": "warn", "format": "yaml"}"#).unwrap();
/// assert_eq!(config.level, LogLevel::Warn);
/// // unknown format resolves to json
/// assert_eq!(config.output_format().as_str(), "json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    /// "json" or "text"
    pub format: String,
    /// "stdout", "stderr" or "file"
    pub output: String,
    pub file_path: PathBuf,
    /// Megabytes before rotation
    pub max_size: u64,
    /// Retired files to keep; 0 keeps all
    pub max_backups: usize,
    /// Days to keep retired files; 0 keeps them forever
    pub max_age: u64,
    pub compress: bool,
    pub add_caller: bool,
    pub add_stack: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: "json".to_string(),
            output: "stdout".to_string(),
            file_path: PathBuf::from("logs/app.log"),
            max_size: 100,
            max_backups: 3,
            max_age: 28,
            compress: true,
            add_caller: true,
            add_stack: false,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    #[must_use]
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = output.into();
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::parse_lossy(&self.format)
    }

    pub fn output_target(&self) -> OutputTarget {
        OutputTarget::parse_lossy(&self.output)
    }

    /// Rotation settings for the file target
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::from_limits(self.max_size, self.max_backups, self.max_age, self.compress)
    }

    /// Replace unrecognised values with defaults and, for the file target,
    /// create the log directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::IoOperation`] if the directory cannot be
    /// created.
    pub fn validate(&mut self) -> Result<()> {
        self.format = self.output_format().as_str().to_string();
        self.output = self.output_target().as_str().to_string();
        if self.max_size == 0 {
            self.max_size = Self::default().max_size;
        }

        if self.output_target() == OutputTarget::File {
            if self.file_path.as_os_str().is_empty() {
                self.file_path = Self::default().file_path;
            }
            if let Some(dir) = self.file_path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        format!("Failed to create directory '{}'", dir.display()),
                        e,
                    )
                })?;
            }
        }

        Ok(())
    }
}
