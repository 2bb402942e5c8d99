//! File handler implementation

use super::maintenance::BackupNaming;
use super::rotating_file::{RotatingFileWriter, RotationPolicy};
use crate::core::{Formatter, Handler, LogEntry, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Writes formatted entries to a size-rotated log file
///
/// # Example
///
/// ```no_run
/// use structured_logger::handlers::{FileHandler, RotationPolicy};
/// use structured_logger::formatters::JsonFormatter;
///
/// let handler = FileHandler::new(
///     "logs/app.log",
///     RotationPolicy::default(),
///     Box::new(JsonFormatter::new()),
/// ).unwrap();
/// ```
pub struct FileHandler {
    name: String,
    path: PathBuf,
    formatter: Box<dyn Formatter>,
    naming: BackupNaming,
    writer: Mutex<RotatingFileWriter>,
}

impl FileHandler {
    /// # Errors
    ///
    /// Returns error if the file cannot be created, opened or locked
    pub fn new<P: AsRef<Path>>(
        path: P,
        policy: RotationPolicy,
        formatter: Box<dyn Formatter>,
    ) -> Result<Self> {
        let writer = RotatingFileWriter::new(path, policy)?;
        let path = writer.path().to_path_buf();
        let naming = writer.naming().clone();
        Ok(Self {
            name: format!("file:{}", path.display()),
            path,
            formatter,
            naming,
            writer: Mutex::new(writer),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until retired files have been compressed and pruned
    ///
    /// The writer lock is only held to queue the request, so concurrent
    /// `handle` calls keep going while this waits.
    pub fn wait_for_maintenance(&self) {
        let done = self.writer.lock().maintenance_barrier();
        if let Some(done) = done {
            let _ = done.recv();
        }
    }

    /// Retired files, oldest first
    ///
    /// # Errors
    ///
    /// Fails if the log directory cannot be read
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        self.naming.paths()
    }
}

impl Handler for FileHandler {
    fn handle(&self, entry: &LogEntry) -> Result<()> {
        let bytes = self.formatter.format(entry)?;
        self.writer.lock().write(&bytes)
    }

    fn close(&self) -> Result<()> {
        self.writer.lock().close()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
