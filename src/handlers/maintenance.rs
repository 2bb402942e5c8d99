//! Background bookkeeping for retired log files
//!
//! Rotation only renames the active file. Compression and pruning of the
//! renamed files happen here, on a dedicated thread fed through a
//! crossbeam channel, so the write path never waits on them.

use super::rotating_file::RotationPolicy;
use crate::core::error::{LoggerError, Result};
use chrono::{NaiveDateTime, Utc};
use crossbeam_channel::{Receiver, Sender};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

/// Timestamp embedded in retired file names; sorts chronologically as text
pub(crate) const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.6f";

const COMPRESSED_SUFFIX: &str = ".gz";
const CHUNK_SIZE: usize = 64 * 1024;

/// How retired files of one active log file are named.
///
/// `logs/app.log` retires to `logs/app-20250108T103045.123456.log` and,
/// once compressed, `logs/app-20250108T103045.123456.log.gz`.
#[derive(Debug, Clone)]
pub(crate) struct BackupNaming {
    dir: PathBuf,
    stem: String,
    extension: String,
}

/// One retired file, possibly present in both plain and compressed form
/// while compression is in flight.
#[derive(Debug, Clone)]
pub(crate) struct Backup {
    pub timestamp: NaiveDateTime,
    pub plain: Option<PathBuf>,
    pub compressed: Option<PathBuf>,
}

impl Backup {
    fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.plain.iter().chain(self.compressed.iter())
    }

    /// The path a reader should prefer
    pub fn path(&self) -> Option<&PathBuf> {
        self.compressed.as_ref().or(self.plain.as_ref())
    }
}

impl BackupNaming {
    pub fn for_active(path: &Path) -> Self {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();

        Self { dir, stem, extension }
    }

    pub fn backup_path(&self, timestamp: NaiveDateTime) -> PathBuf {
        self.dir.join(format!(
            "{}-{}{}",
            self.stem,
            timestamp.format(BACKUP_TIMESTAMP_FORMAT),
            self.extension
        ))
    }

    /// `true` if this name is taken in either form
    pub fn is_taken(&self, timestamp: NaiveDateTime) -> bool {
        let plain = self.backup_path(timestamp);
        plain.exists() || compressed_path(&plain).exists()
    }

    /// Parse a directory entry name into (timestamp, compressed)
    fn parse(&self, file_name: &str) -> Option<(NaiveDateTime, bool)> {
        let rest = file_name.strip_prefix(&self.stem)?.strip_prefix('-')?;
        let (rest, compressed) = match rest.strip_suffix(COMPRESSED_SUFFIX) {
            Some(inner) => (inner, true),
            None => (rest, false),
        };
        let timestamp = rest.strip_suffix(self.extension.as_str())?;
        NaiveDateTime::parse_from_str(timestamp, BACKUP_TIMESTAMP_FORMAT)
            .ok()
            .map(|ts| (ts, compressed))
    }

    /// Paths of retired files, oldest first, compressed form preferred
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .list()?
            .iter()
            .filter_map(|b| b.path().cloned())
            .collect())
    }

    /// Retired files, oldest first
    pub fn list(&self) -> Result<Vec<Backup>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            LoggerError::io_operation(
                "list retired log files",
                format!("Failed to read directory '{}'", self.dir.display()),
                e,
            )
        })?;

        let mut backups: BTreeMap<NaiveDateTime, Backup> = BTreeMap::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some((timestamp, compressed)) = name.to_str().and_then(|n| self.parse(n)) else {
                continue;
            };
            let backup = backups.entry(timestamp).or_insert_with(|| Backup {
                timestamp,
                plain: None,
                compressed: None,
            });
            if compressed {
                backup.compressed = Some(entry.path());
            } else {
                backup.plain = Some(entry.path());
            }
        }

        Ok(backups.into_values().collect())
    }
}

fn compressed_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(COMPRESSED_SUFFIX);
    PathBuf::from(name)
}

enum Job {
    Sweep,
    Barrier(Sender<()>),
}

/// Handle to the maintenance thread of one rotating file
pub(crate) struct MaintenanceWorker {
    sender: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl MaintenanceWorker {
    pub fn spawn(naming: BackupNaming, policy: RotationPolicy) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::unbounded();

        let handle = std::thread::Builder::new()
            .name("log-maintenance".to_string())
            .spawn(move || run(receiver, naming, policy))
            .map_err(|e| {
                LoggerError::io_operation(
                    "spawn maintenance worker",
                    "Failed to start log maintenance thread".to_string(),
                    e,
                )
            })?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queue a compression and pruning pass
    pub fn schedule(&self) {
        if let Some(ref sender) = self.sender {
            let _ = sender.send(Job::Sweep);
        }
    }

    /// Queue a marker; the returned receiver fires once every pass queued
    /// before it has finished
    pub fn barrier(&self) -> Option<Receiver<()>> {
        let sender = self.sender.as_ref()?;
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        sender.send(Job::Barrier(done_tx)).ok()?;
        Some(done_rx)
    }

    /// Block until every pass queued so far has finished
    pub fn wait(&self) {
        if let Some(done) = self.barrier() {
            let _ = done.recv();
        }
    }

    /// Let queued passes finish, then stop the thread
    pub fn shutdown(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("[LOGGER ERROR] Log maintenance thread panicked");
            }
        }
    }
}

impl Drop for MaintenanceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(receiver: Receiver<Job>, naming: BackupNaming, policy: RotationPolicy) {
    while let Ok(job) = receiver.recv() {
        match job {
            Job::Sweep => {
                // several rotations may have queued passes; one covers them all
                let mut barriers = Vec::new();
                for pending in receiver.try_iter() {
                    if let Job::Barrier(done) = pending {
                        barriers.push(done);
                    }
                }
                if let Err(e) = sweep(&naming, &policy) {
                    eprintln!("[LOGGER WARNING] Log maintenance failed: {}", e);
                }
                for done in barriers {
                    let _ = done.send(());
                }
            }
            Job::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Prune by count and age, then compress what is left.
pub(crate) fn sweep(naming: &BackupNaming, policy: &RotationPolicy) -> Result<()> {
    let mut backups = naming.list()?;
    let mut expired = Vec::new();

    if policy.max_backups > 0 && backups.len() > policy.max_backups {
        let excess = backups.len() - policy.max_backups;
        expired.extend(backups.drain(..excess));
    }

    if let Some(max_age) = policy.max_age.filter(|age| !age.is_zero()) {
        let cutoff = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| Utc::now().naive_utc().checked_sub_signed(age));
        if let Some(cutoff) = cutoff {
            let (old, keep): (Vec<Backup>, Vec<Backup>) =
                backups.into_iter().partition(|b| b.timestamp < cutoff);
            expired.extend(old);
            backups = keep;
        }
    }

    for backup in &expired {
        for path in backup.paths() {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove old log file {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
    }

    if policy.compress {
        for backup in &backups {
            if let Some(ref plain) = backup.plain {
                if let Err(e) = compress_file(plain) {
                    eprintln!("[LOGGER WARNING] {}", e);
                }
            }
        }
    }

    Ok(())
}

/// Gzip `path` to `<path>.gz`, removing the original only once the
/// compressed file is complete.
pub(crate) fn compress_file(path: &Path) -> Result<PathBuf> {
    let gz_path = compressed_path(path);
    let mut temp_name = gz_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(CHUNK_SIZE, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(CHUNK_SIZE, output),
        flate2::Compression::default(),
    );

    let streamed = (|| -> std::io::Result<()> {
        let mut buffer = vec![0u8; CHUNK_SIZE];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            encoder.write_all(&buffer[..bytes_read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(gz_path)
}
