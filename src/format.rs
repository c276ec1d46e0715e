//! Line layout shared by every sink:
//!
//! ```text
//! <prefix>(<pid>): <timestamp>;<LEVEL>: <message>
//! ```

use crate::constants::TIMESTAMP_FORMAT;
use crate::level::record_name;
use chrono::{DateTime, Local};

/// Formats log records for one sink generation.
///
/// The prefix and process id are fixed when the formatter is built (once per
/// reconfiguration); only the timestamp changes from line to line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormatter {
    prefix: String,
    pid: u32,
}

impl LineFormatter {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pid: std::process::id(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Format a line stamped with the current local time
    pub fn format(&self, rank: i32, message: &str) -> String {
        self.format_at(Local::now(), rank, message)
    }

    pub fn format_at(&self, at: DateTime<Local>, rank: i32, message: &str) -> String {
        format!(
            "{}({}): {};{}: {}\n",
            self.prefix,
            self.pid,
            at.format(TIMESTAMP_FORMAT),
            record_name(rank),
            message
        )
    }
}
