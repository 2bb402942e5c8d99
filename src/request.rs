//! Request-scoped logging for HTTP servers
//!
//! Framework-agnostic: a server integration calls [`RequestLogger::begin`]
//! when a request arrives and [`RequestLogger::finish`] once the response
//! is written. Everything logged in between through
//! [`RequestLogger::logger`] carries the request id.

use crate::core::{Fields, LogContext, LogLevel, Logger};
use chrono::Local;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::time::{Duration, Instant};

/// Inbound header carrying a caller-supplied request id
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const RANDOM_SUFFIX_LEN: usize = 8;

/// What the server knows about a request when it starts
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    pub client_ip: String,
    /// Value of the `X-Request-ID` header, if present
    pub request_id: Option<String>,
}

/// `<YYYYMMDDHHMMSS>-<8 random alphanumerics>`
pub fn generate_request_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}-{}", Local::now().format("%Y%m%d%H%M%S"), suffix)
}

/// Level a completed request is logged at
pub fn level_for_status(status: u16) -> LogLevel {
    match status {
        500..=u16::MAX => LogLevel::Error,
        400..=499 => LogLevel::Warn,
        _ => LogLevel::Info,
    }
}

fn completion_message(status: u16) -> &'static str {
    match status {
        500..=u16::MAX => "Request failed with server error",
        400..=499 => "Request failed with client error",
        _ => "Request completed",
    }
}

/// Logging scope of one request
///
/// # Example
///
/// ```
/// use structured_logger::request::{RequestInfo, RequestLogger};
/// use structured_logger::{fields, Logger, LogLevel};
///
/// let logger = Logger::new(LogLevel::Info);
/// let request = RequestLogger::begin(&logger, RequestInfo {
///     method: "GET".into(),
///     path: "/products/7".into(),
///     client_ip: "10.0.0.1".into(),
///     request_id: None,
/// });
///
/// request.logger().info(request.context(), "loading product", fields! { "id" => 7 });
/// request.finish(200, 512);
/// ```
pub struct RequestLogger {
    logger: Logger,
    context: LogContext,
    request_id: String,
    method: String,
    path: String,
    started: Instant,
}

impl RequestLogger {
    /// Derive the request's logger and log `Request started`
    #[track_caller]
    pub fn begin(logger: &Logger, info: RequestInfo) -> Self {
        let request_id = info
            .request_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(generate_request_id);

        let context = LogContext::background().with_request_id(request_id.clone());
        let scoped = logger
            .with_context(&context)
            .with_fields(Fields::new().with("request_id", request_id.as_str()));

        scoped.info(
            &context,
            "Request started",
            Fields::new()
                .with("method", info.method.as_str())
                .with("path", info.path.as_str())
                .with("client_ip", info.client_ip),
        );

        Self {
            logger: scoped,
            context,
            request_id,
            method: info.method,
            path: info.path,
            started: Instant::now(),
        }
    }

    /// Logger carrying `request_id` on every entry
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn context(&self) -> &LogContext {
        &self.context
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Log the completion, at a level chosen by [`level_for_status`]
    #[track_caller]
    pub fn finish(self, status: u16, body_size: u64) {
        self.finish_with_errors(status, body_size, None);
    }

    /// Like [`finish`](Self::finish), recording handler errors as `errors`
    #[track_caller]
    pub fn finish_with_errors(self, status: u16, body_size: u64, errors: Option<&str>) {
        let mut fields = Fields::new()
            .with("method", self.method.as_str())
            .with("path", self.path.as_str())
            .with("status", status)
            .with("latency", format!("{:?}", self.elapsed()))
            .with("body_size", body_size);
        if let Some(errors) = errors.filter(|e| !e.is_empty()) {
            fields.insert("errors", errors);
        }

        self.logger.log(
            &self.context,
            level_for_status(status),
            completion_message(status),
            None,
            fields,
        );
    }
}

/// One completed request, for plain access logging
#[derive(Debug, Clone, Default)]
pub struct AccessRecord {
    pub method: String,
    pub path: String,
    pub raw_query: String,
    pub client_ip: String,
    pub user_agent: String,
    pub status: u16,
    pub latency: Duration,
    pub body_size: u64,
    pub errors: Option<String>,
}

/// Write a single access-log entry for a finished request
///
/// Server errors are logged at Error, client errors at Warn, redirects and
/// successes at Info.
#[track_caller]
pub fn log_access(logger: &Logger, ctx: &LogContext, record: &AccessRecord) {
    let message = match record.status {
        500..=u16::MAX => "HTTP Server Error",
        400..=499 => "HTTP Client Error",
        300..=399 => "HTTP Redirect",
        _ => "HTTP Request",
    };

    let mut fields = Fields::new()
        .with("method", record.method.as_str())
        .with("path", record.path.as_str())
        .with("raw_query", record.raw_query.as_str())
        .with("client_ip", record.client_ip.as_str())
        .with("status", record.status)
        .with("latency", format!("{:?}", record.latency))
        .with("body_size", record.body_size)
        .with("user_agent", record.user_agent.as_str());
    if let Some(ref errors) = record.errors {
        fields.insert("errors", errors.as_str());
    }

    logger.log(ctx, level_for_status(record.status), message, None, fields);
}
