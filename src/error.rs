//! Error type shared by every fallible operation of the crate.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the registry and the logging facade.
///
/// Only argument validation is recoverable. Filesystem problems are reported
/// with the path that could not be opened so the caller can decide whether to
/// fall back to console logging or abort.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A level of unsupported type/name, or a non-boolean `force` flag
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A log file (or the directory it should live in) could not be opened
    #[error("cannot open log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A configuration table or file could not be interpreted
    #[error("invalid logger configuration: {0}")]
    Config(String),
}

impl LoggingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoggingError>;
