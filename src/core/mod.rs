//! Core logger types and traits

pub mod config;
pub mod error;
pub mod fields;
pub mod formatter;
pub mod handler;
pub mod log_context;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod stack;
pub mod timestamp;

pub use config::{LoggerConfig, OutputTarget};
pub use error::{LoggerError, Result};
pub use fields::{FieldValue, Fields};
pub use formatter::Formatter;
pub use handler::Handler;
pub use log_context::{LogContext, REQUEST_ID_KEY};
pub use log_entry::{describe_error, LogEntry};
pub use log_level::LogLevel;
pub use logger::{Logger, LoggerBuilder, FALLBACK_MESSAGE, FATAL_EXIT_CODE};
pub use timestamp::TimestampFormat;
