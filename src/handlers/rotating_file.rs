//! Size-based rotating file writer
//!
//! The writer appends to a single active file. When a write would push the
//! file past the configured size, the active file is renamed to a
//! timestamp-suffixed backup and a fresh file is opened. Retired files are
//! then compressed and pruned by the [maintenance](super::maintenance)
//! worker.

use super::maintenance::{BackupNaming, MaintenanceWorker};
use crate::core::error::{LoggerError, Result};
use chrono::{NaiveDateTime, Utc};
use crossbeam_channel::Receiver;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Size used when a policy asks for a max size of zero (100 MB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 100 * 1024 * 1024;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

// Pause between rotation attempts after one fails
const ROTATION_RETRY_DELAY: Duration = Duration::from_secs(5);

/// When to rotate and what to retain
///
/// # Examples
///
/// ```
/// use structured_logger::handlers::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .with_max_size(50 * 1024 * 1024)
///     .with_max_backups(7)
///     .with_max_age_days(14)
///     .with_compression(true);
/// assert_eq!(policy.max_backups, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write that would make the active file larger than this
    pub max_size_bytes: u64,
    /// Retired files to keep; 0 keeps all of them
    pub max_backups: usize,
    /// Retired files older than this are deleted; `None` keeps them forever
    pub max_age: Option<Duration>,
    /// Gzip retired files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            max_backups: 3,
            max_age: Some(Duration::from_secs(28 * SECONDS_PER_DAY)),
            compress: true,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the units used in configuration (megabytes and days)
    #[must_use]
    pub fn from_limits(max_size_mb: u64, max_backups: usize, max_age_days: u64, compress: bool) -> Self {
        Self::new()
            .with_max_size(max_size_mb.saturating_mul(1024 * 1024))
            .with_max_backups(max_backups)
            .with_max_age_days(max_age_days)
            .with_compression(compress)
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, bytes: u64) -> Self {
        self.max_size_bytes = if bytes == 0 { DEFAULT_MAX_SIZE_BYTES } else { bytes };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age.filter(|age| !age.is_zero());
        self
    }

    /// Age limit in days; 0 disables age-based pruning
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(self, days: u64) -> Self {
        self.with_max_age(Some(Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY))))
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }
}

/// Append-only writer for one log file with size-based rotation
///
/// Not synchronised by itself; [`FileHandler`](super::FileHandler) owns it
/// behind a mutex.
///
/// # Examples
///
/// ```no_run
/// use structured_logger::handlers::{RotatingFileWriter, RotationPolicy};
///
/// let mut writer = RotatingFileWriter::new("logs/app.log", RotationPolicy::default()).unwrap();
/// writer.write(b"{\"message\":\"hello\"}\n").unwrap();
/// writer.close().unwrap();
/// ```
pub struct RotatingFileWriter {
    path: PathBuf,
    policy: RotationPolicy,
    naming: BackupNaming,
    file: Option<File>,
    current_size: u64,
    last_backup: Option<NaiveDateTime>,
    retry_rotation_at: Option<Instant>,
    maintenance: MaintenanceWorker,
    closed: bool,
}

impl RotatingFileWriter {
    /// Open (or create) the active file and start its maintenance worker
    ///
    /// # Errors
    ///
    /// Fails if the parent directory or the file cannot be created, or if
    /// another writer holds the file lock.
    pub fn new<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let policy = policy.clone().with_max_size(policy.max_size_bytes);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size) = Self::open_active(&path)?;
        Self::lock(&file, &path)?;

        let naming = BackupNaming::for_active(&path);
        let maintenance = MaintenanceWorker::spawn(naming.clone(), policy.clone())?;
        // stale backups from earlier runs
        maintenance.schedule();

        Ok(Self {
            path,
            policy,
            naming,
            file: Some(file),
            current_size,
            last_backup: None,
            retry_rotation_at: None,
            maintenance,
            closed: false,
        })
    }

    fn open_active(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_handler(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;
        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_handler(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    #[cfg(feature = "file")]
    fn lock(file: &File, path: &Path) -> Result<()> {
        use fs2::FileExt;
        file.try_lock_exclusive()
            .map_err(|_| LoggerError::file_lock(path.display().to_string()))
    }

    #[cfg(not(feature = "file"))]
    fn lock(_file: &File, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Append `bytes` as one unit, rotating first if they would not fit
    ///
    /// # Errors
    ///
    /// Fails if the writer is closed or the write itself fails. A failed
    /// rotation is reported on stderr and the write goes to the current file.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(LoggerError::HandlerClosed(self.path.display().to_string()));
        }

        let len = bytes.len() as u64;
        if self.current_size > 0
            && self.current_size.saturating_add(len) > self.policy.max_size_bytes
            && self.rotation_due()
        {
            match self.rotate() {
                Ok(()) => self.retry_rotation_at = None,
                Err(e) => {
                    eprintln!(
                        "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                        e
                    );
                    self.retry_rotation_at = Some(Instant::now() + ROTATION_RETRY_DELAY);
                    if self.file.is_none() {
                        let (file, size) = Self::open_active(&self.path)?;
                        if let Err(e) = Self::lock(&file, &self.path) {
                            eprintln!("[LOGGER WARNING] {}", e);
                        }
                        self.file = Some(file);
                        self.current_size = size;
                    }
                }
            }
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        file.write_all(bytes).map_err(|e| {
            LoggerError::file_handler(
                self.path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += len;
        Ok(())
    }

    fn rotation_due(&self) -> bool {
        self.retry_rotation_at
            .map_or(true, |retry_at| Instant::now() >= retry_at)
    }

    /// Retire the active file and start a new one
    ///
    /// # Errors
    ///
    /// Fails if the active file cannot be renamed or reopened.
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let timestamp = self.next_backup_timestamp();
        let backup = self.naming.backup_path(timestamp);
        fs::rename(&self.path, &backup).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to rotate current log file: {}", e),
            )
        })?;
        self.last_backup = Some(timestamp);

        let (file, size) = Self::open_active(&self.path).map_err(|e| {
            LoggerError::file_rotation(
                self.path.display().to_string(),
                format!("Failed to create new log file: {}", e),
            )
        })?;
        if let Err(e) = Self::lock(&file, &self.path) {
            eprintln!("[LOGGER WARNING] {}", e);
        }
        self.file = Some(file);
        self.current_size = size;

        self.maintenance.schedule();
        Ok(())
    }

    // Unique and strictly increasing, even for rotations within one microsecond
    fn next_backup_timestamp(&self) -> NaiveDateTime {
        let step = chrono::Duration::microseconds(1);
        let mut timestamp = Utc::now().naive_utc();
        if let Some(last) = self.last_backup {
            if timestamp <= last {
                timestamp = last + step;
            }
        }
        while self.naming.is_taken(timestamp) {
            timestamp += step;
        }
        timestamp
    }

    /// # Errors
    ///
    /// Fails if the underlying file cannot be flushed.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut file) = self.file {
            file.flush().map_err(|e| {
                LoggerError::file_handler(
                    self.path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Block until queued compression and pruning are done
    pub fn wait_for_maintenance(&self) {
        self.maintenance.wait();
    }

    pub(crate) fn maintenance_barrier(&self) -> Option<Receiver<()>> {
        self.maintenance.barrier()
    }

    /// Flush, release the file and stop the maintenance worker
    ///
    /// Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the final flush fails; the file is released regardless.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let flushed = self.flush();
        self.file = None;
        self.maintenance.shutdown();
        flushed
    }

    /// Retired files, oldest first (compressed path when compressed)
    ///
    /// # Errors
    ///
    /// Fails if the log directory cannot be read.
    pub fn backups(&self) -> Result<Vec<PathBuf>> {
        self.naming.paths()
    }

    pub(crate) fn naming(&self) -> &BackupNaming {
        &self.naming
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
