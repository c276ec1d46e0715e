//! # Logger Configuration Module
//!
//! This module holds the configuration bundle a caller hands to the registry
//! when it asks for the shared logger. The same struct is kept inside the
//! logger state as the "last known settings", so that a later change of only
//! the destination can rebuild the sinks with every other parameter intact.
//!
//! ## Sources
//!
//! A configuration can be built three ways:
//! 1. **In code**: `LoggerConfig::default().with_level(LogLevel::Debug)...`
//! 2. **Keyword table**: [`LoggerConfig::from_table`] accepts a dynamically
//!    typed option bundle (including the `force` flag) and validates types
//! 3. **TOML file**: [`LoggerConfig::load`] reads the same keys from disk
//!
//! ## Defaults
//!
//! - level `INFO`
//! - console output only (no destination path)
//! - when a file is configured: tee to console, rotate at 1,000,000 bytes,
//!   keep 500 historical files

use crate::constants::{DEFAULT_LOGGER_NAME, DEFAULT_MAX_BYTES_PER_FILE, DEFAULT_MAX_FILE_COUNT};
use crate::error::{LoggingError, Result};
use crate::level::LevelArg;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Construction and reconfiguration parameters of the shared logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    /// Minimum severity emitted by the logger and by every sink
    pub level: LevelArg,

    /// Log file path; `None` means console output only
    pub destination_path: Option<PathBuf>,

    /// Mirror file output to the console as well (ignored without a file)
    pub also_console: bool,

    /// Size/count bounded rotation instead of one ever-growing file
    pub rotating: bool,

    /// Rollover threshold of the active file
    pub max_bytes_per_file: u64,

    /// Historical files kept before the oldest is discarded
    pub max_file_count: u32,

    /// Text at the start of every line; defaults to the program's basename
    pub message_prefix: Option<String>,

    /// Identity of the logger; defaults to [`DEFAULT_LOGGER_NAME`]
    pub name: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LevelArg::default(),
            destination_path: None,
            also_console: true,
            rotating: true,
            max_bytes_per_file: DEFAULT_MAX_BYTES_PER_FILE,
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            message_prefix: None,
            name: None,
        }
    }
}

/// Output layout implied by a configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkConfig {
    Console,
    PlainFile {
        path: PathBuf,
    },
    RotatingFile {
        path: PathBuf,
        max_bytes_per_file: u64,
        max_file_count: u32,
    },
}

impl SinkConfig {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SinkConfig::Console => None,
            SinkConfig::PlainFile { path } | SinkConfig::RotatingFile { path, .. } => Some(path),
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: impl Into<LevelArg>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_destination(mut self, path: impl Into<PathBuf>) -> Self {
        self.destination_path = Some(path.into());
        self
    }

    pub fn with_also_console(mut self, also_console: bool) -> Self {
        self.also_console = also_console;
        self
    }

    pub fn with_rotating(mut self, rotating: bool) -> Self {
        self.rotating = rotating;
        self
    }

    pub fn with_max_bytes_per_file(mut self, max_bytes: u64) -> Self {
        self.max_bytes_per_file = max_bytes;
        self
    }

    pub fn with_max_file_count(mut self, max_files: u32) -> Self {
        self.max_file_count = max_files;
        self
    }

    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = Some(prefix.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The file/console layout this configuration asks for
    pub fn sink_config(&self) -> SinkConfig {
        match &self.destination_path {
            None => SinkConfig::Console,
            Some(path) if self.rotating => SinkConfig::RotatingFile {
                path: path.clone(),
                max_bytes_per_file: self.max_bytes_per_file,
                max_file_count: self.max_file_count,
            },
            Some(path) => SinkConfig::PlainFile { path: path.clone() },
        }
    }

    /// Whether a console sink runs next to a file sink
    pub fn tees_to_console(&self) -> bool {
        self.destination_path.is_some() && self.also_console
    }

    pub fn resolved_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| DEFAULT_LOGGER_NAME.to_string())
    }

    /// Prefix for formatted lines.
    ///
    /// Without an explicit prefix the program's basename is looked up on every
    /// call; the facade calls this once per reconfiguration.
    pub fn resolved_prefix(&self) -> String {
        self.message_prefix.clone().unwrap_or_else(program_basename)
    }

    /// Build a configuration from a keyword-style option table.
    ///
    /// Returns the configuration together with the `force` flag. Type errors in
    /// `force` or `level` are reported as [`LoggingError::InvalidArgument`];
    /// anything else that does not fit the struct (unknown keys, wrong types
    /// for other options) as [`LoggingError::Config`].
    pub fn from_table(table: &toml::Table) -> Result<(Self, bool)> {
        let mut table = table.clone();

        let force = match table.remove("force") {
            None => false,
            Some(toml::Value::Boolean(force)) => force,
            Some(other) => {
                return Err(LoggingError::InvalidArgument(format!(
                    "force keyword value must be true or false, not '{other}'"
                )))
            }
        };

        if let Some(level) = table.get("level") {
            LevelArg::try_from(level)?;
        }

        let config = toml::Value::Table(table)
            .try_into::<LoggerConfig>()
            .map_err(|e| LoggingError::Config(e.to_string()))?;

        Ok((config, force))
    }

    /// Parse a TOML document holding the configuration keys.
    ///
    /// A `force` key is validated but has no effect here; forcing is a
    /// property of the acquire call.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| LoggingError::Config(e.to_string()))?;
        Self::from_table(&table).map(|(config, _force)| config)
    }

    /// Load the configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| LoggingError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Write the configuration as TOML, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| LoggingError::io(parent, e))?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| LoggingError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| LoggingError::io(path, e))
    }
}

/// Basename of the running program (argv[0]), falling back to the package name
pub fn program_basename() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, LevelArg::Named(LogLevel::Info));
        assert_eq!(config.sink_config(), SinkConfig::Console);
        assert!(config.also_console);
        assert!(config.rotating);
        assert_eq!(config.max_bytes_per_file, 1_000_000);
        assert_eq!(config.max_file_count, 500);
        assert_eq!(config.resolved_name(), "logging_service");
        assert!(!config.tees_to_console());
    }

    #[test]
    fn test_sink_config_variants() {
        let rotating = LoggerConfig::default()
            .with_destination("/tmp/a.log")
            .with_max_bytes_per_file(10)
            .with_max_file_count(3);
        assert_eq!(
            rotating.sink_config(),
            SinkConfig::RotatingFile {
                path: PathBuf::from("/tmp/a.log"),
                max_bytes_per_file: 10,
                max_file_count: 3,
            }
        );
        assert!(rotating.tees_to_console());

        let plain = rotating.clone().with_rotating(false).with_also_console(false);
        assert_eq!(
            plain.sink_config(),
            SinkConfig::PlainFile {
                path: PathBuf::from("/tmp/a.log")
            }
        );
        assert!(!plain.tees_to_console());
    }

    #[test]
    fn test_from_table_reads_force_and_level() {
        let table: toml::Table = toml::from_str(
            r#"
            force = true
            level = "debug"
            destination_path = "/tmp/x.log"
            rotating = false
            "#,
        )
        .unwrap();

        let (config, force) = LoggerConfig::from_table(&table).unwrap();
        assert!(force);
        assert_eq!(config.level, LevelArg::Named(LogLevel::Debug));
        assert_eq!(config.destination_path, Some(PathBuf::from("/tmp/x.log")));
        assert!(!config.rotating);
    }

    #[test]
    fn test_from_table_rejects_non_boolean_force() {
        let table: toml::Table = toml::from_str(r#"force = "yes""#).unwrap();
        assert!(matches!(
            LoggerConfig::from_table(&table),
            Err(LoggingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_from_table_rejects_unknown_keys() {
        let table: toml::Table = toml::from_str("colour = true").unwrap();
        assert!(matches!(
            LoggerConfig::from_table(&table),
            Err(LoggingError::Config(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("logging.toml");

        let config = LoggerConfig::default()
            .with_level(15)
            .with_destination(dir.path().join("app.log"))
            .with_message_prefix("svc")
            .with_name("svc-logger");
        config.save(&path).unwrap();

        assert_eq!(LoggerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoggerConfig::load("/nonexistent/dir/logging.toml").unwrap_err();
        assert!(matches!(err, LoggingError::Io { .. }));
    }

    #[test]
    fn test_explicit_prefix_wins() {
        let config = LoggerConfig::default().with_message_prefix("worker");
        assert_eq!(config.resolved_prefix(), "worker");
        assert!(!LoggerConfig::default().resolved_prefix().is_empty());
    }
}
