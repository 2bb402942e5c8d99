//! Handler trait for log output destinations

use super::{
    error::{LoggerError, Result},
    log_entry::LogEntry,
};
use std::panic::{self, AssertUnwindSafe};

/// Delivers entries to a sink.
///
/// Implementations serialize concurrent `handle` calls internally, so one
/// handler can be shared by any number of loggers and threads.
pub trait Handler: Send + Sync {
    /// Format and write one entry, inline, before returning
    fn handle(&self, entry: &LogEntry) -> Result<()>;

    /// Flush and release the sink
    fn close(&self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Run `op` on `handler`; a panic comes back as `HandlerPanicked`
pub(crate) fn guarded<F>(handler: &dyn Handler, op: F) -> Result<()>
where
    F: FnOnce(&dyn Handler) -> Result<()>,
{
    panic::catch_unwind(AssertUnwindSafe(|| op(handler))).unwrap_or_else(|payload| {
        Err(LoggerError::handler_panicked(
            handler.name(),
            panic_message(payload.as_ref()),
        ))
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
