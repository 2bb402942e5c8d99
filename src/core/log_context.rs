//! Caller-supplied context handle
//!
//! A `LogContext` travels with a single log call. The engine never stores it
//! as logger state; formatters only read contextual metadata (such as the
//! request correlation id) out of it while rendering.

use std::collections::BTreeMap;
use std::sync::Arc;

/// Key under which the request correlation id is stored.
pub const REQUEST_ID_KEY: &str = "request_id";

/// Immutable, cheaply clonable bag of contextual values.
///
/// Extending a context returns a new one; existing clones are unaffected.
///
/// # Example
///
/// ```
/// use structured_logger::LogContext;
///
/// let ctx = LogContext::background().with_request_id("20250108103045-a1b2c3d4");
/// assert_eq!(ctx.request_id(), Some("20250108103045-a1b2c3d4"));
/// assert!(LogContext::background().request_id().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    values: Arc<BTreeMap<String, String>>,
}

impl LogContext {
    /// An empty context
    pub fn background() -> Self {
        Self::default()
    }

    /// Return a copy of this context with `key` set to `value`
    #[must_use]
    pub fn with_value(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = (*self.values).clone();
        values.insert(key.into(), value.into());
        Self {
            values: Arc::new(values),
        }
    }

    /// Return a copy of this context carrying a request correlation id
    #[must_use]
    pub fn with_request_id(&self, request_id: impl Into<String>) -> Self {
        self.with_value(REQUEST_ID_KEY, request_id)
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn request_id(&self) -> Option<&str> {
        self.value(REQUEST_ID_KEY)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
