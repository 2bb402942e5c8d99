//! # Structured Logger
//!
//! A structured logging engine: leveled, field-annotated log records
//! delivered to console streams or size-rotated files.
//!
//! ## Features
//!
//! - **Structured**: every entry carries typed key/value fields
//! - **Scoped Loggers**: `with_fields` derives loggers that add fields to every call
//! - **Multiple Handlers**: Console, rotating file, and fan-out handlers
//! - **Thread Safe**: concurrent writes to one handler never interleave
//! - **Fail Safe**: a broken sink never surfaces an error to the caller
//!
//! ## Example
//!
//! ```
//! use structured_logger::prelude::*;
//! use structured_logger::fields;
//!
//! let logger = Logger::from_config(&LoggerConfig::default()).unwrap();
//! let ctx = LogContext::background().with_request_id("req-1");
//!
//! logger.info(&ctx, "request completed", fields! { "status" => 200, "path" => "/health" });
//! ```

pub mod core;
pub mod formatters;
pub mod handlers;
pub mod macros;
pub mod request;

pub mod prelude {
    pub use crate::core::{
        FieldValue, Fields, Formatter, Handler, LogContext, LogEntry, LogLevel, Logger,
        LoggerBuilder, LoggerConfig, LoggerError, OutputTarget, Result, TimestampFormat,
    };
    pub use crate::formatters::{JsonFormatter, OutputFormat, TextFormatter};
    pub use crate::handlers::{
        ConsoleHandler, ConsoleTarget, FileHandler, MultiHandler, RotationPolicy,
    };
}

pub use core::{
    FieldValue, Fields, Formatter, Handler, LogContext, LogEntry, LogLevel, Logger, LoggerBuilder,
    LoggerConfig, LoggerError, OutputTarget, Result, TimestampFormat,
};
pub use formatters::{JsonFormatter, OutputFormat, TextFormatter};
pub use handlers::{ConsoleHandler, ConsoleTarget, FileHandler, MultiHandler, RotationPolicy};
