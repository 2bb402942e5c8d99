//! Macros for building fields and logging formatted messages.
//!
//! # Examples
//!
//! ```
//! use structured_logger::prelude::*;
//! use structured_logger::{fields, info};
//!
//! let logger = Logger::new(LogLevel::Info);
//! let ctx = LogContext::background();
//!
//! // Structured call
//! logger.info(&ctx, "server started", fields! { "port" => 8080, "tls" => false });
//!
//! // Formatted message, no fields
//! let port = 8080;
//! info!(logger, &ctx, "listening on port {}", port);
//! ```

/// Build a [`Fields`](crate::Fields) value from `key => value` pairs.
///
/// # Examples
///
/// ```
/// use structured_logger::{fields, FieldValue};
///
/// let fields = fields! { "status" => 200, "path" => "/health" };
/// assert_eq!(fields.get("status"), Some(&FieldValue::Int(200)));
///
/// let empty = fields! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(fields.insert($key, $value);)+
        fields
    }};
}

/// Log a formatted message at the given level without extra fields.
///
/// # Examples
///
/// ```
/// # use structured_logger::prelude::*;
/// # let logger = Logger::new(LogLevel::Info);
/// # let ctx = LogContext::background();
/// use structured_logger::log;
/// log!(logger, &ctx, LogLevel::Info, "Simple message");
/// log!(logger, &ctx, LogLevel::Warn, "Retry {} of {}", 2, 5);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $ctx:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($ctx, $level, format!($($arg)+), None, $crate::Fields::new())
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use structured_logger::prelude::*;
/// # let logger = Logger::new(LogLevel::Debug);
/// # let ctx = LogContext::background();
/// use structured_logger::debug;
/// debug!(logger, &ctx, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message without an attached error value.
///
/// Use [`Logger::error`](crate::Logger::error) to attach one.
#[macro_export]
macro_rules! error {
    ($logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::log!($logger, $ctx, $crate::LogLevel::Error, $($arg)+)
    };
}
