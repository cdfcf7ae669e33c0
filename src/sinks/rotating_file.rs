//! Rotating file sink with size-based rotation
//!
//! The file is opened lazily on the first write. When a write would push the
//! file past its size limit, the file is renamed to a timestamped backup
//! (`app-2025-01-08T10-30-45.123.log`) and a fresh file is started. After each
//! rotation old backups are pruned by count and age, and the survivors are
//! gzip-compressed when compression is enabled.

use crate::core::{LoggerError, Result, Sink};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

const MEGABYTE: u64 = 1024 * 1024;
const BACKUP_TIME_FORMAT: &str = "%Y-%m-%dT%H-%M-%S%.3f";
const COMPRESS_SUFFIX: &str = ".gz";

/// Configuration for the rotating file sink
///
/// # Examples
///
/// ```
/// use kv_log_facade::sinks::RotationPolicy;
///
/// // 50 MB files, keep two weeks and at most 30 backups, gzip the backups
/// let policy = RotationPolicy::new()
///     .with_max_size(50)
///     .with_max_age(14)
///     .with_max_backups(30)
///     .with_compression(true);
/// assert_eq!(policy.max_bytes(), 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    max_bytes: u64,
    /// Days to retain backups; 0 keeps them regardless of age
    pub max_age_days: u32,
    /// Number of backups to retain; 0 keeps them all
    pub max_backups: usize,
    /// Use local time rather than UTC in backup file names
    pub local_time: bool,
    /// Whether to gzip rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: MEGABYTE,
            max_age_days: 7,
            max_backups: 50,
            local_time: true,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum file size in megabytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, megabytes: u64) -> Self {
        self.max_bytes = megabytes.saturating_mul(MEGABYTE);
        self
    }

    /// Set the maximum file size in bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age(mut self, days: u32) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_local_time(mut self, enabled: bool) -> Self {
        self.local_time = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit in bytes; a zero limit means the 1 MB default
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        if self.max_bytes == 0 {
            MEGABYTE
        } else {
            self.max_bytes
        }
    }
}

/// A rotated-out file found next to the active one
#[derive(Debug, Clone)]
struct Backup {
    path: PathBuf,
    timestamp: NaiveDateTime,
    compressed: bool,
}

/// Rotating file sink
///
/// # Examples
///
/// ```no_run
/// use kv_log_facade::sinks::{RotatingFileSink, RotationPolicy};
///
/// let sink = RotatingFileSink::with_policy(
///     "/var/log/app.log",
///     RotationPolicy::new().with_max_size(10).with_compression(true),
/// );
/// ```
pub struct RotatingFileSink {
    base_path: PathBuf,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
}

impl RotatingFileSink {
    /// Create a sink with the default policy. No file is touched until the
    /// first write.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_policy(path, RotationPolicy::default())
    }

    pub fn with_policy<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Self {
        Self {
            base_path: path.as_ref().to_path_buf(),
            policy,
            writer: None,
            current_size: 0,
        }
    }

    /// Open the existing file for appending, unless it is already too full to
    /// take `write_len` more bytes, in which case rotate first.
    fn open_existing_or_new(&mut self, write_len: u64) -> Result<()> {
        let metadata = match fs::metadata(&self.base_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return self.open_new(),
            Err(e) => {
                return Err(LoggerError::io_operation(
                    "open log file",
                    format!("Cannot access '{}'", self.base_path.display()),
                    e,
                ))
            }
        };

        if metadata.len() + write_len >= self.policy.max_bytes() {
            return self.rotate_for_write();
        }

        match OpenOptions::new().append(true).open(&self.base_path) {
            Ok(file) => {
                self.writer = Some(BufWriter::new(file));
                self.current_size = metadata.len();
                Ok(())
            }
            // Unwritable existing file: start over with a fresh one
            Err(_) => self.open_new(),
        }
    }

    /// Move the current file aside (if any) and open a new, empty one
    fn open_new(&mut self) -> Result<()> {
        if let Some(parent) = self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        if self.base_path.exists() {
            let backup = self.backup_path();
            fs::rename(&self.base_path, &backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to move current log file to '{}': {}", backup.display(), e),
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.base_path)
            .map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        self.writer = Some(BufWriter::new(file));
        self.current_size = 0;
        Ok(())
    }

    /// Close the current file, move it to a backup and start a new one, then
    /// prune and compress backups.
    ///
    /// Errors from pruning or compression are returned after the new file is
    /// already open, so the sink stays writable.
    pub fn rotate(&mut self) -> Result<()> {
        // Explicitly drop writer to release the file handle before renaming
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.open_new()?;
        self.mill()
    }

    /// Rotate ahead of a pending write. Retention or compression failures
    /// are reported and swallowed once a fresh file is open, so the record
    /// still lands.
    fn rotate_for_write(&mut self) -> Result<()> {
        match self.rotate() {
            Err(e) if self.writer.is_some() => {
                eprintln!("[LOGGER WARNING] Log rotation incomplete: {}", e);
                Ok(())
            }
            other => other,
        }
    }

    fn now_naive(&self) -> NaiveDateTime {
        if self.policy.local_time {
            Local::now().naive_local()
        } else {
            Utc::now().naive_utc()
        }
    }

    fn name_parts(&self) -> (String, String) {
        let stem = self
            .base_path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .base_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e))
            .unwrap_or_default();
        (stem, ext)
    }

    fn log_dir(&self) -> PathBuf {
        match self.base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Timestamped backup name, bumped by a millisecond until it is unused
    fn backup_path(&self) -> PathBuf {
        let (stem, ext) = self.name_parts();
        let dir = self.log_dir();
        let mut timestamp = self.now_naive();

        loop {
            let candidate = dir.join(format!(
                "{}-{}{}",
                stem,
                timestamp.format(BACKUP_TIME_FORMAT),
                ext
            ));
            if !candidate.exists() && !with_suffix(&candidate, COMPRESS_SUFFIX).exists() {
                return candidate;
            }
            timestamp += ChronoDuration::milliseconds(1);
        }
    }

    /// Backups in the log directory, newest first
    fn backups(&self) -> Result<Vec<Backup>> {
        let (stem, ext) = self.name_parts();
        let prefix = format!("{}-", stem);
        let dir = self.log_dir();

        let mut backups = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };

            let (rest, compressed) = match name.strip_suffix(COMPRESS_SUFFIX) {
                Some(rest) => (rest, true),
                None => (name, false),
            };
            let Some(ts) = rest
                .strip_prefix(prefix.as_str())
                .and_then(|r| r.strip_suffix(ext.as_str()))
            else {
                continue;
            };

            if let Ok(timestamp) = NaiveDateTime::parse_from_str(ts, BACKUP_TIME_FORMAT) {
                backups.push(Backup {
                    path: entry.path(),
                    timestamp,
                    compressed,
                });
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    /// Apply retention (count, then age) and compression to backups
    fn mill(&self) -> Result<()> {
        let mut backups = self.backups()?;
        let mut removals = Vec::new();

        if self.policy.max_backups > 0 && backups.len() > self.policy.max_backups {
            removals.extend(backups.split_off(self.policy.max_backups));
        }

        if self.policy.max_age_days > 0 {
            let cutoff = self.now_naive() - ChronoDuration::days(i64::from(self.policy.max_age_days));
            let (keep, expired): (Vec<_>, Vec<_>) =
                backups.into_iter().partition(|b| b.timestamp >= cutoff);
            backups = keep;
            removals.extend(expired);
        }

        for backup in &removals {
            if let Err(e) = fs::remove_file(&backup.path) {
                eprintln!(
                    "[LOGGER WARNING] Failed to remove old backup {}: {}",
                    backup.path.display(),
                    e
                );
            }
        }

        if self.policy.compress {
            for backup in backups.iter().filter(|b| !b.compressed) {
                compress_file(&backup.path)?;
            }
        }

        Ok(())
    }

    /// Get current file size
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Compress a log file with transactional safety using streaming I/O
///
/// The original file is only deleted after compression fully succeeds.
fn compress_file(path: &Path) -> Result<()> {
    use std::io::{BufReader, Read};

    let gz_path = with_suffix(path, COMPRESS_SUFFIX);
    let temp_gz_path = with_suffix(path, ".gz.tmp");

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary compressed file: {}", temp_gz_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed = (|| -> std::io::Result<()> {
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

    Ok(())
}

impl Sink for RotatingFileSink {
    fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let len = buf.len() as u64;
        let max = self.policy.max_bytes();
        if len > max {
            return Err(LoggerError::write_too_large(len, max));
        }

        if self.writer.is_none() {
            self.open_existing_or_new(len)?;
        }

        if self.current_size + len > max {
            self.rotate_for_write()?;
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(buf).map_err(|e| {
            LoggerError::file_sink(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += len;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
            writer.get_ref().sync_data().map_err(|e| {
                LoggerError::file_sink(
                    self.base_path.display().to_string(),
                    format!("Failed to sync: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "rotating_file"
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            // Best effort flush - ignore errors during drop
            let _ = writer.flush();
        }
    }
}
