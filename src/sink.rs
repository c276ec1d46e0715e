//! # Output Sinks
//!
//! A sink receives fully formatted lines and writes them to one destination.
//! Each sink carries its own level floor, independent of the logger's floor;
//! the facade keeps both in step but a line is only written when it passes
//! both.
//!
//! ## Available Sinks
//!
//! - [`ConsoleSink`]: standard output, with a swappable stream so tests can
//!   intercept what would have been printed
//! - [`FileSink`]: one file, appended to without bound
//! - [`RotatingFileSink`]: one active file rolled over at a size threshold,
//!   with a bounded number of numbered history files (`app.log.1`, ...)
//!
//! Writes are serialized per sink by an internal mutex. Poisoned locks are
//! recovered since a half-written line is preferable to losing the sink.

use crate::error::{LoggingError, Result};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Kind of destination a sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Console,
    PlainFile,
    RotatingFile,
}

/// Destination for formatted log lines
pub trait Sink: Send + Sync + fmt::Debug {
    fn kind(&self) -> SinkKind;

    /// Current level floor of this sink
    fn level(&self) -> i32;

    fn set_level(&self, level: i32);

    /// Write one formatted line (including its trailing newline)
    fn write_line(&self, line: &str) -> io::Result<()>;

    fn flush(&self) -> io::Result<()>;

    /// Whether a record of the given rank passes this sink's floor
    fn accepts(&self, rank: i32) -> bool {
        rank >= self.level()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Writes to standard output, or to whatever stream was swapped in
pub struct ConsoleSink {
    level: AtomicI32,
    stream: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    pub fn stdout(level: i32) -> Self {
        Self::with_stream(level, Box::new(io::stdout()))
    }

    pub fn with_stream(level: i32, stream: Box<dyn Write + Send>) -> Self {
        Self {
            level: AtomicI32::new(level),
            stream: Mutex::new(stream),
        }
    }

    /// Replace the underlying stream, returning the previous one.
    ///
    /// Pending output of the previous stream is flushed first.
    pub fn set_stream(&self, stream: Box<dyn Write + Send>) -> Box<dyn Write + Send> {
        let mut guard = lock(&self.stream);
        let _ = guard.flush();
        std::mem::replace(&mut *guard, stream)
    }
}

impl fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("level", &self.level())
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn kind(&self) -> SinkKind {
        SinkKind::Console
    }

    fn level(&self) -> i32 {
        self.level.load(Ordering::Acquire)
    }

    fn set_level(&self, level: i32) {
        self.level.store(level, Ordering::Release);
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut stream = lock(&self.stream);
        stream.write_all(line.as_bytes())?;
        stream.flush()
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.stream).flush()
    }
}

/// In-memory stream for intercepting console output
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&lock(&self.bytes)).into_owned()
    }

    pub fn clear(&self) {
        lock(&self.bytes).clear();
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.bytes).is_empty()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.bytes).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Plain file
// ---------------------------------------------------------------------------

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LoggingError::io(path, e))
}

/// Appends every line to a single file
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    level: AtomicI32,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl Into<PathBuf>, level: i32) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        Ok(Self {
            path,
            level: AtomicI32::new(level),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::PlainFile
    }

    fn level(&self) -> i32 {
        self.level.load(Ordering::Acquire)
    }

    fn set_level(&self, level: i32) {
        self.level.store(level, Ordering::Release);
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        lock(&self.file).write_all(line.as_bytes())
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.file).flush()
    }
}

// ---------------------------------------------------------------------------
// Rotating file
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct ActiveFile {
    file: File,
    size: u64,
}

/// Size and count bounded rotating log file.
///
/// Before a line is written, the sink checks whether it would take the active
/// file to `max_bytes_per_file` or beyond. If so, history files are shifted
/// (`path.1` becomes `path.2`, ..., the oldest beyond `max_file_count` is
/// dropped), the active file becomes `path.1` and a fresh active file is
/// opened. A zero threshold or a zero count disables rollover, and the
/// active file then grows without bound.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes_per_file: u64,
    max_file_count: u32,
    level: AtomicI32,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink {
    pub fn open(
        path: impl Into<PathBuf>,
        max_bytes_per_file: u64,
        max_file_count: u32,
        level: i32,
    ) -> Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file
            .metadata()
            .map_err(|e| LoggingError::io(&path, e))?
            .len();

        Ok(Self {
            path,
            max_bytes_per_file,
            max_file_count,
            level: AtomicI32::new(level),
            active: Mutex::new(ActiveFile { file, size }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_bytes_per_file(&self) -> u64 {
        self.max_bytes_per_file
    }

    pub fn max_file_count(&self) -> u32 {
        self.max_file_count
    }

    /// Path of the `index`-th history file (`app.log.1`, `app.log.2`, ...)
    pub fn history_path(&self, index: u32) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn should_roll_over(&self, active: &ActiveFile, incoming: usize) -> bool {
        // An empty file always takes the line, even one longer than the limit
        self.max_bytes_per_file > 0
            && self.max_file_count > 0
            && active.size > 0
            && active.size + incoming as u64 >= self.max_bytes_per_file
    }

    fn roll_over(&self, active: &mut ActiveFile) -> io::Result<()> {
        active.file.flush()?;

        // Shift history up by one, oldest first; whatever sits at
        // `max_file_count` is overwritten and so dropped
        for index in (1..self.max_file_count).rev() {
            let source = self.history_path(index);
            if source.exists() {
                let target = self.history_path(index + 1);
                if target.exists() {
                    fs::remove_file(&target)?;
                }
                fs::rename(&source, &target)?;
            }
        }

        // The active file becomes the newest history entry
        let first = self.history_path(1);
        if first.exists() {
            fs::remove_file(&first)?;
        }
        fs::rename(&self.path, &first)?;

        active.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        active.size = 0;
        debug!(path = %self.path.display(), "rolled over log file");
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn kind(&self) -> SinkKind {
        SinkKind::RotatingFile
    }

    fn level(&self) -> i32 {
        self.level.load(Ordering::Acquire)
    }

    fn set_level(&self, level: i32) {
        self.level.store(level, Ordering::Release);
    }

    fn write_line(&self, line: &str) -> io::Result<()> {
        // Rollover and write happen under one lock so no line lands in a
        // file that is being renamed
        let mut active = lock(&self.active);
        if self.should_roll_over(&active, line.len()) {
            self.roll_over(&mut active)?;
        }
        active.file.write_all(line.as_bytes())?;
        active.size += line.len() as u64;
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.active).file.flush()
    }
}
