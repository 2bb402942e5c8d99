//! Formatter trait for rendering entries to bytes

use super::{error::Result, log_entry::LogEntry};

/// Renders an entry as one complete, newline-terminated record.
///
/// Formatting must be a pure function of the entry so a single formatter can
/// be called from several handlers at once.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>>;

    fn name(&self) -> &str;
}
