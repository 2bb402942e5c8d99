//! Main logger implementation

use super::{
    config::{LoggerConfig, OutputTarget},
    error::{LoggerError, Result},
    fields::Fields,
    handler::{self, Handler},
    log_context::LogContext,
    log_entry::LogEntry,
    log_level::LogLevel,
    stack,
};
use crate::handlers::{ConsoleHandler, ConsoleTarget, FileHandler};
use std::error::Error;
use std::panic::Location;
use std::sync::Arc;

/// Message of the diagnostic written when a handler fails
pub const FALLBACK_MESSAGE: &str = "Failed to write log entry";

/// Exit status used by [`Logger::fatal`]
pub const FATAL_EXIT_CODE: i32 = 1;

// Frames under this path are engine internals, not the log call site
const LOGGER_PATH: &str = concat!(module_path!(), "::Logger");

struct LoggerCore {
    min_level: LogLevel,
    handler: Arc<dyn Handler>,
    fallback: Arc<dyn Handler>,
    capture_stack: bool,
}

/// The logging engine
///
/// Cheap to clone. Derived loggers from [`with_fields`](Logger::with_fields)
/// and [`with_context`](Logger::with_context) share the handler and level
/// of their parent but carry their own base fields; the parent is never
/// modified.
///
/// Logging calls never return an error. A handler failure is reported on
/// the fallback handler (stderr by default) and the entry is dropped.
///
/// # Example
///
/// ```
/// use structured_logger::{fields, LogContext, Logger, LogLevel};
/// use structured_logger::handlers::ConsoleHandler;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Info)
///     .handler(Arc::new(ConsoleHandler::stdout()))
///     .build();
///
/// let ctx = LogContext::background();
/// let scoped = logger.with_fields(fields! { "component" => "billing" });
/// scoped.info(&ctx, "invoice sent", fields! { "invoice_id" => 42 });
/// ```
#[derive(Clone)]
pub struct Logger {
    core: Arc<LoggerCore>,
    fields: Arc<Fields>,
}

impl Logger {
    /// Logger writing JSON to stdout at the given level
    pub fn new(min_level: LogLevel) -> Self {
        Self::builder().min_level(min_level).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Build the formatter and handler described by `config`
    ///
    /// Invalid values fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Fails only for the file target, when the log directory or file cannot
    /// be created or locked.
    pub fn from_config(config: &LoggerConfig) -> Result<Self> {
        let mut config = config.clone();
        config.validate()?;

        let formatter = config
            .output_format()
            .build(config.add_caller, config.add_stack);

        let handler: Arc<dyn Handler> = match config.output_target() {
            OutputTarget::Stdout => Arc::new(ConsoleHandler::new(ConsoleTarget::Stdout, formatter)),
            OutputTarget::Stderr => Arc::new(ConsoleHandler::new(ConsoleTarget::Stderr, formatter)),
            OutputTarget::File => Arc::new(FileHandler::new(
                &config.file_path,
                config.rotation_policy(),
                formatter,
            )?),
        };

        Ok(Self::builder()
            .min_level(config.level)
            .handler(handler)
            .capture_stack(config.add_stack)
            .build())
    }

    #[must_use]
    pub fn level(&self) -> LogLevel {
        self.core.min_level
    }

    #[must_use]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.core.min_level
    }

    /// Base fields carried by this logger
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Derive a logger whose base fields are this logger's overlaid with `extra`
    #[must_use]
    pub fn with_fields(&self, extra: Fields) -> Logger {
        Logger {
            core: Arc::clone(&self.core),
            fields: Arc::new(self.fields.merged(&extra)),
        }
    }

    /// Derive a logger for work done under `ctx`
    ///
    /// The context is not stored; pass it to each call so values such as the
    /// request id are read at write time.
    #[must_use]
    pub fn with_context(&self, _ctx: &LogContext) -> Logger {
        self.clone()
    }

    #[track_caller]
    pub fn debug(&self, ctx: &LogContext, message: impl Into<String>, fields: Fields) {
        self.log(ctx, LogLevel::Debug, message, None, fields);
    }

    #[track_caller]
    pub fn info(&self, ctx: &LogContext, message: impl Into<String>, fields: Fields) {
        self.log(ctx, LogLevel::Info, message, None, fields);
    }

    #[track_caller]
    pub fn warn(&self, ctx: &LogContext, message: impl Into<String>, fields: Fields) {
        self.log(ctx, LogLevel::Warn, message, None, fields);
    }

    #[track_caller]
    pub fn error(
        &self,
        ctx: &LogContext,
        message: impl Into<String>,
        error: Option<&(dyn Error + 'static)>,
        fields: Fields,
    ) {
        self.log(ctx, LogLevel::Error, message, error, fields);
    }

    /// Log at Fatal, then exit the process with status 1
    #[track_caller]
    pub fn fatal(
        &self,
        ctx: &LogContext,
        message: impl Into<String>,
        error: Option<&(dyn Error + 'static)>,
        fields: Fields,
    ) -> ! {
        self.log(ctx, LogLevel::Fatal, message, error, fields);
        std::process::exit(FATAL_EXIT_CODE);
    }

    /// Write one entry at `level`
    ///
    /// Below the minimum level this returns before building anything.
    #[track_caller]
    pub fn log(
        &self,
        ctx: &LogContext,
        level: LogLevel,
        message: impl Into<String>,
        error: Option<&(dyn Error + 'static)>,
        fields: Fields,
    ) {
        if !self.is_enabled(level) {
            return;
        }

        let location = Location::caller();
        let mut entry = LogEntry::new(level, message)
            .with_fields(self.fields.merged(&fields))
            .with_location(location.file(), location.line())
            .with_context(ctx.clone());

        if let Some(error) = error {
            entry = entry.with_error(error);
            if self.core.capture_stack {
                entry = entry.with_stack(stack::capture(stack::DEFAULT_STACK_DEPTH, &[LOGGER_PATH]));
            }
        }

        self.dispatch(&entry);
    }

    fn dispatch(&self, entry: &LogEntry) {
        if let Err(e) = handler::guarded(self.core.handler.as_ref(), |h| h.handle(entry)) {
            self.report_failure(entry, &e);
        }
    }

    /// Best effort: one diagnostic on the fallback handler, never the main one
    fn report_failure(&self, dropped: &LogEntry, failure: &LoggerError) {
        let diagnostic = LogEntry::new(LogLevel::Error, FALLBACK_MESSAGE)
            .with_error(failure)
            .with_fields(
                Fields::new()
                    .with("handler", self.core.handler.name())
                    .with("dropped_level", dropped.level.to_str())
                    .with("dropped_message", dropped.message.as_str()),
            )
            .with_context(dropped.context.clone());

        let _ = handler::guarded(self.core.fallback.as_ref(), |h| h.handle(&diagnostic));
    }

    /// Flush and release the shared handler
    ///
    /// Affects every logger derived from the same root.
    ///
    /// # Errors
    ///
    /// Returns the handler's close error, if any.
    pub fn close(&self) -> Result<()> {
        self.core.handler.close()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("min_level", &self.core.min_level)
            .field("handler", &self.core.handler.name())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for configuring a Logger
///
/// # Example
///
/// ```
/// use structured_logger::{Logger, LogLevel};
/// use structured_logger::handlers::{ConsoleHandler, ConsoleTarget};
/// use structured_logger::formatters::TextFormatter;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .handler(Arc::new(ConsoleHandler::new(
///         ConsoleTarget::Stderr,
///         Box::new(TextFormatter::new().with_caller(true)),
///     )))
///     .capture_stack(true)
///     .build();
/// assert_eq!(logger.level(), LogLevel::Debug);
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    handler: Option<Arc<dyn Handler>>,
    fallback: Option<Arc<dyn Handler>>,
    capture_stack: bool,
    fields: Fields,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            handler: None,
            fallback: None,
            capture_stack: false,
            fields: Fields::new(),
        }
    }

    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Handler receiving every entry; JSON on stdout if not set
    #[must_use]
    pub fn handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Handler for failure diagnostics; text on stderr if not set
    #[must_use]
    pub fn fallback(mut self, handler: Arc<dyn Handler>) -> Self {
        self.fallback = Some(handler);
        self
    }

    /// Attach a stack trace to entries that carry an error
    #[must_use]
    pub fn capture_stack(mut self, enabled: bool) -> Self {
        self.capture_stack = enabled;
        self
    }

    /// Base fields of the root logger
    #[must_use]
    pub fn fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn build(self) -> Logger {
        Logger {
            core: Arc::new(LoggerCore {
                min_level: self.min_level,
                handler: self
                    .handler
                    .unwrap_or_else(|| Arc::new(ConsoleHandler::stdout())),
                fallback: self
                    .fallback
                    .unwrap_or_else(|| Arc::new(ConsoleHandler::stderr_text())),
                capture_stack: self.capture_stack,
            }),
            fields: Arc::new(self.fields),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldValue;
    use crate::formatters::{JsonFormatter, TextFormatter};
    use parking_lot::Mutex;
    use std::io::Write;

    /// Collects entries instead of writing them
    #[derive(Default)]
    struct Recorder {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl Handler for Recorder {
        fn handle(&self, entry: &LogEntry) -> Result<()> {
            self.entries.lock().push(entry.clone());
            Ok(())
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    struct Failing {
        panic: bool,
    }

    impl Handler for Failing {
        fn handle(&self, _entry: &LogEntry) -> Result<()> {
            if self.panic {
                panic!("sink exploded");
            }
            Err(LoggerError::writer("disk full"))
        }

        fn close(&self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn recording(level: LogLevel) -> (Logger, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let logger = Logger::builder()
            .min_level(level)
            .handler(recorder.clone())
            .build();
        (logger, recorder)
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(logger.fields().is_empty());
        assert!(format!("{:?}", logger).contains("console:stdout"));
    }

    #[test]
    fn test_below_threshold_is_not_delivered() {
        let (logger, recorder) = recording(LogLevel::Warn);
        let ctx = LogContext::background();

        logger.debug(&ctx, "debug", Fields::new());
        logger.info(&ctx, "info", Fields::new());
        assert!(recorder.entries.lock().is_empty());

        logger.warn(&ctx, "warn", Fields::new());
        logger.error(&ctx, "error", None, Fields::new());
        assert_eq!(recorder.entries.lock().len(), 2);
    }

    #[test]
    fn test_call_fields_override_base_fields() {
        let (logger, recorder) = recording(LogLevel::Debug);
        let scoped = logger.with_fields(Fields::new().with("service", "api").with("env", "dev"));

        scoped.info(
            &LogContext::background(),
            "hello",
            Fields::new().with("env", "prod").with("user", 7),
        );

        let entries = recorder.entries.lock();
        let fields = &entries[0].fields;
        assert_eq!(fields.get("service"), Some(&FieldValue::from("api")));
        assert_eq!(fields.get("env"), Some(&FieldValue::from("prod")));
        assert_eq!(fields.get("user"), Some(&FieldValue::Int(7)));
    }

    #[test]
    fn test_derivation_leaves_parent_unchanged() {
        let (root, recorder) = recording(LogLevel::Info);
        let child = root.with_fields(Fields::new().with("request_id", "abc"));
        let ctx = LogContext::background();

        child.info(&ctx, "child", Fields::new());
        root.info(&ctx, "root", Fields::new());

        let entries = recorder.entries.lock();
        assert!(entries[0].fields.contains_key("request_id"));
        assert!(entries[1].fields.is_empty());
        assert!(root.fields().is_empty());
    }

    #[test]
    fn test_with_context_shares_handler() {
        let (root, recorder) = recording(LogLevel::Info);
        let ctx = LogContext::background().with_request_id("req-1");
        let derived = root.with_context(&ctx);

        derived.info(&ctx, "from derived", Fields::new());
        root.info(&LogContext::background(), "from root", Fields::new());

        let entries = recorder.entries.lock();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context.request_id(), Some("req-1"));
        assert_eq!(entries[1].context.request_id(), None);
    }

    #[test]
    fn test_caller_location_is_the_call_site() {
        let (logger, recorder) = recording(LogLevel::Info);
        let line = line!() + 1;
        logger.info(&LogContext::background(), "here", Fields::new());

        let entries = recorder.entries.lock();
        assert_eq!(entries[0].file.as_deref(), Some("logger.rs"));
        assert_eq!(entries[0].line, Some(line));
    }

    #[test]
    fn test_error_is_attached() {
        let (logger, recorder) = recording(LogLevel::Info);
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such table");

        logger.error(&LogContext::background(), "query failed", Some(&err), Fields::new());

        let entries = recorder.entries.lock();
        assert_eq!(entries[0].error.as_deref(), Some("no such table"));
        assert!(entries[0].stack.is_empty());
    }

    #[test]
    fn test_stack_captured_only_for_errors() {
        let recorder = Arc::new(Recorder::default());
        let logger = Logger::builder()
            .handler(recorder.clone())
            .capture_stack(true)
            .build();
        let ctx = LogContext::background();
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");

        logger.warn(&ctx, "no error", Fields::new());
        logger.error(&ctx, "with error", Some(&err), Fields::new());

        let entries = recorder.entries.lock();
        assert!(entries[0].stack.is_empty());
        assert!(entries[1].stack.len() <= stack::DEFAULT_STACK_DEPTH);
        assert!(entries[1]
            .stack
            .iter()
            .all(|frame| !frame.contains(LOGGER_PATH)));
    }

    fn fallback_capture(panic: bool) -> (Logger, SharedBuffer) {
        let buffer = SharedBuffer::default();
        let logger = Logger::builder()
            .handler(Arc::new(Failing { panic }))
            .fallback(Arc::new(ConsoleHandler::with_writer(
                Box::new(buffer.clone()),
                Box::new(TextFormatter::new()),
            )))
            .build();
        (logger, buffer)
    }

    #[test]
    fn test_handler_error_goes_to_fallback() {
        let (logger, buffer) = fallback_capture(false);

        logger.info(&LogContext::background(), "payment captured", Fields::new());

        let output = buffer.contents();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("[ERROR] Failed to write log entry"));
        assert!(output.contains("dropped_message=payment captured"));
        assert!(output.contains("handler=failing"));
        assert!(output.contains("error=Writer error: disk full"));
    }

    #[test]
    fn test_handler_panic_goes_to_fallback() {
        let (logger, buffer) = fallback_capture(true);

        logger.warn(&LogContext::background(), "still running", Fields::new());

        let output = buffer.contents();
        assert!(output.contains("dropped_level=WARN"));
        assert!(output.contains("panicked: sink exploded"));
    }

    #[test]
    fn test_failing_fallback_is_ignored() {
        let logger = Logger::builder()
            .handler(Arc::new(Failing { panic: false }))
            .fallback(Arc::new(Failing { panic: true }))
            .build();
        logger.error(&LogContext::background(), "nowhere to go", None, Fields::new());
    }

    #[test]
    fn test_formatting_error_goes_to_fallback() {
        let buffer = SharedBuffer::default();
        let fallback = SharedBuffer::default();
        let logger = Logger::builder()
            .handler(Arc::new(ConsoleHandler::with_writer(
                Box::new(buffer.clone()),
                Box::new(JsonFormatter::new()),
            )))
            .fallback(Arc::new(ConsoleHandler::with_writer(
                Box::new(fallback.clone()),
                Box::new(TextFormatter::new()),
            )))
            .build();

        logger.info(
            &LogContext::background(),
            "ratio",
            Fields::new().with("ratio", f64::INFINITY),
        );

        assert!(buffer.contents().is_empty());
        assert!(fallback.contents().contains("is not a finite number"));
    }
}
