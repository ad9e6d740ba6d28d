//! Date-partitioned hook event logging.
//!
//! Every hook invocation is appended as a JSONL line to a daily log file in
//! the log directory: `hooks_<YYYYMMDD>.log` for the combined log, or
//! `hooks_<source>_<YYYYMMDD>.log` when the caller asks for per-source files.
//!
//! Writers take an exclusive advisory lock on the file for the duration of
//! the write, so concurrent hook processes never interleave partial lines.
//! Logging never fails the caller: any error is turned into a single JSON
//! diagnostic line on stderr.

use crate::config::HooksConfig;
use crate::error::{Error, Result};
use crate::paths;
use crate::traits::{Clock, SystemClock};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix shared by every log file name.
pub const LOG_FILE_PREFIX: &str = "hooks";

/// Extension of log files.
pub const LOG_FILE_EXTENSION: &str = "log";

/// Marker written in the `error` field of fallback diagnostics.
pub const LOGGING_FAILED: &str = "logging_failed";

/// One record in a log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry<T = serde_json::Value> {
    /// RFC 3339 local timestamp captured when the entry was written.
    pub timestamp: String,
    /// Name of the event source.
    pub hook: String,
    /// Caller-supplied payload.
    pub data: T,
    /// Process id of the writer.
    pub pid: u32,
}

/// Build the log file name for a date and source.
///
/// The source is only part of the name when `separate_files` is set, and is
/// sanitized with [`sanitize_source`] so it can never leave the log directory.
#[must_use]
pub fn log_file_name(date: NaiveDate, source: &str, separate_files: bool) -> String {
    let date = date.format("%Y%m%d");
    if separate_files {
        format!("{LOG_FILE_PREFIX}_{}_{date}.{LOG_FILE_EXTENSION}", sanitize_source(source))
    } else {
        format!("{LOG_FILE_PREFIX}_{date}.{LOG_FILE_EXTENSION}")
    }
}

/// Replace every character outside `[A-Za-z0-9_-]` with `-`.
#[must_use]
pub fn sanitize_source(source: &str) -> String {
    source
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}

/// Appends hook events to date-partitioned log files.
#[derive(Clone)]
pub struct EventLogger {
    log_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLogger").field("log_dir", &self.log_dir).finish_non_exhaustive()
    }
}

impl EventLogger {
    /// Create a logger writing into `log_dir` using the system clock.
    #[must_use]
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(log_dir, Arc::new(SystemClock))
    }

    /// Create a logger with an explicit clock.
    #[must_use]
    pub fn with_clock(log_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self { log_dir: log_dir.into(), clock }
    }

    /// Create a logger for a project, honoring its config and environment.
    #[must_use]
    pub fn for_project(project_dir: &Path, config: &HooksConfig) -> Self {
        Self::new(paths::log_dir(project_dir, config))
    }

    /// The directory log files are written to.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// The file an entry for `source` would be written to right now.
    #[must_use]
    pub fn log_path(&self, source: &str, separate_files: bool) -> PathBuf {
        self.path_for(self.clock.now().date_naive(), source, separate_files)
    }

    fn path_for(&self, date: NaiveDate, source: &str, separate_files: bool) -> PathBuf {
        self.log_dir.join(log_file_name(date, source, separate_files))
    }

    /// Log an event, reporting failures on stderr.
    ///
    /// This never returns an error and never panics: if the entry cannot be
    /// written, a single JSON diagnostic line is printed to stderr instead.
    /// Stderr is only locked after a failed write, so a writer waiting on one
    /// file's lock never holds up writers of other files.
    pub fn log_event<T: Serialize + ?Sized>(&self, source: &str, payload: &T, separate_files: bool) {
        let now = self.clock.now();
        if let Err(e) = self.write_at(now, source, payload, separate_files) {
            write_diagnostic(&mut std::io::stderr().lock(), now, source, &e);
        }
    }

    /// Log an event, reporting failures to `diagnostics`.
    pub fn log_event_to<T, W>(&self, source: &str, payload: &T, separate_files: bool, diagnostics: &mut W)
    where
        T: Serialize + ?Sized,
        W: Write + ?Sized,
    {
        let now = self.clock.now();
        if let Err(e) = self.write_at(now, source, payload, separate_files) {
            write_diagnostic(diagnostics, now, source, &e);
        }
    }

    /// Append an entry and return the file it was written to.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized, or the log
    /// directory or file cannot be created, locked, or written.
    pub fn record<T: Serialize + ?Sized>(
        &self,
        source: &str,
        payload: &T,
        separate_files: bool,
    ) -> Result<PathBuf> {
        self.write_at(self.clock.now(), source, payload, separate_files)
    }

    fn write_at<T: Serialize + ?Sized>(
        &self,
        now: DateTime<Local>,
        source: &str,
        payload: &T,
        separate_files: bool,
    ) -> Result<PathBuf> {
        let entry = LogEntry {
            timestamp: format_timestamp(now),
            hook: source.to_string(),
            data: payload,
            pid: std::process::id(),
        };
        // Serialize up front so a bad payload never touches the file.
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        std::fs::create_dir_all(&self.log_dir)?;
        let path = self.path_for(now.date_naive(), source, separate_files);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        let mut locked = LockedFile::acquire(file)?;
        locked.write_all(line.as_bytes())?;
        locked.sync()?;

        Ok(path)
    }
}

/// Emit the fallback diagnostic for a failed write.
fn write_diagnostic<W: Write + ?Sized>(out: &mut W, now: DateTime<Local>, source: &str, error: &Error) {
    let diagnostic = serde_json::json!({
        "error": LOGGING_FAILED,
        "original_hook": source,
        "exception": error.to_string(),
        "timestamp": format_timestamp(now),
    });
    let _ = writeln!(out, "{diagnostic}");
    let _ = out.flush();
}

fn format_timestamp(now: DateTime<Local>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// An open file holding an exclusive advisory lock until dropped.
struct LockedFile {
    file: File,
}

impl LockedFile {
    /// Block until the exclusive lock on `file` is acquired.
    fn acquire(file: File) -> std::io::Result<Self> {
        FileExt::lock_exclusive(&file)?;
        Ok(Self { file })
    }

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.file.write_all(bytes)
    }

    fn sync(&mut self) -> std::io::Result<()> {
        self.file.flush()?;
        self.file.sync_data()
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        // Closing the handle releases the lock too; unlock explicitly so the
        // release does not depend on when the descriptor is closed.
        let _ = FileExt::unlock(&self.file);
    }
}

/// Log an event for the current project.
///
/// Resolves the project directory and log directory the same way the hook
/// commands do. Failures are reported on stderr and never returned.
pub fn log_event<T: Serialize + ?Sized>(source: &str, payload: &T, separate_files: bool) {
    let project_dir = paths::project_dir();
    let (config, _) = HooksConfig::load_or_default(&project_dir);
    EventLogger::for_project(&project_dir, &config).log_event(source, payload, separate_files);
}
