//! # Logging Facade
//!
//! [`Logger`] is the handle every module holds. Cloning it is cheap and every
//! clone refers to the same [`LoggerState`], so a level or destination change
//! made through one handle is observed through all of them.
//!
//! ## State and locking
//!
//! The state (level, stored configuration, formatter, open sinks) sits behind
//! one mutex. Reconfiguration and level changes hold it for the whole update,
//! so an emit never sees a half-built sink set. Emits hold it only long enough
//! to copy the level check result, the formatter and the sink list, then write
//! without the lock; a sink retired while a write is in flight stays alive
//! until that write finishes.
//!
//! ## Emission
//!
//! A line is written to a sink when its rank passes the logger floor and that
//! sink's own floor. Write failures are dropped (reported through `tracing`
//! only): losing a log line must not fail the caller.

use crate::config::{LoggerConfig, SinkConfig};
use crate::error::Result;
use crate::format::LineFormatter;
use crate::level::{LevelArg, LevelInfo, LogLevel};
use crate::sink::{ConsoleSink, FileSink, RotatingFileSink, Sink};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Open sinks, plus a typed handle on the console sink when there is one
struct SinkSet {
    sinks: Vec<Arc<dyn Sink>>,
    console: Option<Arc<ConsoleSink>>,
}

impl SinkSet {
    /// Open exactly the sinks a configuration asks for
    fn build(config: &LoggerConfig, level: i32) -> Result<Self> {
        let mut sinks: Vec<Arc<dyn Sink>> = Vec::with_capacity(2);

        match config.sink_config() {
            SinkConfig::Console => {}
            SinkConfig::PlainFile { path } => {
                sinks.push(Arc::new(FileSink::open(path, level)?));
            }
            SinkConfig::RotatingFile {
                path,
                max_bytes_per_file,
                max_file_count,
            } => {
                sinks.push(Arc::new(RotatingFileSink::open(
                    path,
                    max_bytes_per_file,
                    max_file_count,
                    level,
                )?));
            }
        }

        let console = if sinks.is_empty() || config.tees_to_console() {
            let console = Arc::new(ConsoleSink::stdout(level));
            sinks.push(console.clone());
            Some(console)
        } else {
            None
        };

        Ok(Self { sinks, console })
    }
}

struct Inner {
    config: LoggerConfig,
    name: String,
    level: i32,
    formatter: Arc<LineFormatter>,
    sinks: Vec<Arc<dyn Sink>>,
    console: Option<Arc<ConsoleSink>>,
}

/// Mutable payload shared by all handles of one logger
pub struct LoggerState {
    inner: Mutex<Inner>,
}

impl LoggerState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Handle on the shared logger
#[derive(Clone)]
pub struct Logger {
    state: Arc<LoggerState>,
}

impl Logger {
    /// Build a logger state from a configuration.
    ///
    /// Callers normally go through the [registry](crate::registry) instead so
    /// that the process shares one state.
    pub(crate) fn new(config: LoggerConfig) -> Result<Self> {
        let level = config.level.rank();
        let set = SinkSet::build(&config, level)?;
        let inner = Inner {
            name: config.resolved_name(),
            formatter: Arc::new(LineFormatter::new(config.resolved_prefix())),
            level,
            sinks: set.sinks,
            console: set.console,
            config,
        };

        Ok(Self {
            state: Arc::new(LoggerState {
                inner: Mutex::new(inner),
            }),
        })
    }

    /// Whether two handles refer to the same logger state
    pub fn ptr_eq(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Replace the whole configuration and rebuild the sink set.
    ///
    /// New sinks are opened before the old ones are released; if a file
    /// cannot be opened the error is returned and the logger keeps its
    /// previous configuration and sinks.
    pub fn reconfigure(&self, config: LoggerConfig) -> Result<()> {
        let (name, sink_count, retired) = {
            let mut inner = self.state.lock();
            Self::install(&mut inner, config)?
        };

        for sink in &retired {
            let _ = sink.flush();
        }
        debug!(logger = %name, sinks = sink_count, "rebuilt sink set");
        Ok(())
    }

    /// Swap in a new configuration under the state lock.
    ///
    /// Returns the logger name, the number of new sinks and the retired sinks.
    fn install(
        inner: &mut Inner,
        config: LoggerConfig,
    ) -> Result<(String, usize, Vec<Arc<dyn Sink>>)> {
        // Open the new sinks first; on error nothing below has run and the
        // current state stays as it was
        let level = config.level.rank();
        let set = SinkSet::build(&config, level)?;
        let sink_count = set.sinks.len();

        inner.name = config.resolved_name();
        inner.formatter = Arc::new(LineFormatter::new(config.resolved_prefix()));
        inner.level = level;
        inner.console = set.console;
        inner.config = config;
        // Old sinks go back to the caller to be flushed outside the lock
        let retired = std::mem::replace(&mut inner.sinks, set.sinks);

        Ok((inner.name.clone(), sink_count, retired))
    }

    /// Current logger floor with its symbolic name
    pub fn level(&self) -> LevelInfo {
        LevelInfo::from_rank(self.state.lock().level)
    }

    /// Apply a new floor to the logger and to every open sink
    pub fn set_level(&self, level: impl Into<LevelArg>) {
        let level = level.into();
        let rank = level.rank();
        {
            let mut inner = self.state.lock();
            inner.level = rank;
            inner.config.level = level;
            for sink in &inner.sinks {
                sink.set_level(rank);
            }
        }
        debug!(level = rank, "logging level changed");
    }

    /// Current log file, `None` when logging to the console only
    pub fn destination(&self) -> Option<PathBuf> {
        self.state.lock().config.destination_path.clone()
    }

    /// Log to a new file, keeping every other stored parameter
    pub fn set_destination(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.change_destination(Some(path.into()))
    }

    /// Go back to console-only output, keeping every other stored parameter
    pub fn clear_destination(&self) -> Result<()> {
        self.change_destination(None)
    }

    fn change_destination(&self, path: Option<PathBuf>) -> Result<()> {
        let (name, sink_count, retired) = {
            let mut inner = self.state.lock();
            // Keep every stored parameter except the path
            let config = LoggerConfig {
                destination_path: path,
                name: Some(inner.name.clone()),
                ..inner.config.clone()
            };
            Self::install(&mut inner, config)?
        };

        for sink in &retired {
            let _ = sink.flush();
        }
        debug!(logger = %name, sinks = sink_count, "log destination changed");
        Ok(())
    }

    /// Sink layout implied by the stored configuration
    pub fn sink_config(&self) -> SinkConfig {
        self.state.lock().config.sink_config()
    }

    /// Copy of the stored configuration
    pub fn config(&self) -> LoggerConfig {
        self.state.lock().config.clone()
    }

    pub fn name(&self) -> String {
        self.state.lock().name.clone()
    }

    pub fn message_prefix(&self) -> String {
        self.state.lock().formatter.prefix().to_string()
    }

    /// Snapshot of the open sinks
    pub fn sinks(&self) -> Vec<Arc<dyn Sink>> {
        self.state.lock().sinks.clone()
    }

    /// The console sink, when console output is active
    pub fn console(&self) -> Option<Arc<ConsoleSink>> {
        self.state.lock().console.clone()
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Debug.rank(), message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Info.rank(), message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Warn.rank(), message.as_ref());
    }

    pub fn err(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Error.rank(), message.as_ref());
    }

    pub fn critical(&self, message: impl AsRef<str>) {
        self.emit(LogLevel::Critical.rank(), message.as_ref());
    }

    /// Emit at an arbitrary level, named or custom
    pub fn log(&self, level: impl Into<LevelArg>, message: impl AsRef<str>) {
        self.emit(level.into().rank(), message.as_ref());
    }

    /// Whether a message of this level would pass the logger floor
    pub fn is_enabled_for(&self, level: impl Into<LevelArg>) -> bool {
        level.into().rank() >= self.state.lock().level
    }

    pub fn flush(&self) {
        for sink in self.sinks() {
            let _ = sink.flush();
        }
    }

    fn emit(&self, rank: i32, message: &str) {
        // Snapshot under the lock, write after releasing it
        let (formatter, sinks) = {
            let inner = self.state.lock();
            if rank < inner.level {
                return;
            }
            (Arc::clone(&inner.formatter), inner.sinks.clone())
        };

        // Formatted at most once, and only if some sink takes it
        let mut line: Option<String> = None;
        for sink in sinks.iter().filter(|sink| sink.accepts(rank)) {
            let line = line.get_or_insert_with(|| formatter.format(rank, message));
            if let Err(e) = sink.write_line(line.as_str()) {
                warn!(kind = ?sink.kind(), error = %e, "dropped log line");
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.state.lock();
        f.debug_struct("Logger")
            .field("name", &inner.name)
            .field("level", &LevelInfo::from_rank(inner.level))
            .field("destination", &inner.config.destination_path)
            .finish()
    }
}
