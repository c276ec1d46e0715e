//! # Logging Service Constants
//!
//! Defaults shared by the configuration layer, the registry and the sinks.
//! Keeping them in one place guarantees that a default-constructed
//! [`LoggerConfig`](crate::config::LoggerConfig) and a TOML table with missing
//! keys resolve to exactly the same logger.

/// Name under which the shared logger is known when the caller supplies none
pub const DEFAULT_LOGGER_NAME: &str = "logging_service";

/// Rotation threshold for a single log file (bytes)
pub const DEFAULT_MAX_BYTES_PER_FILE: u64 = 1_000_000;

/// Number of rotated files kept next to the active one
pub const DEFAULT_MAX_FILE_COUNT: u32 = 500;

/// Timestamp layout used in every formatted line, e.g. `2024-01-15 10:20:30,123`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Level reported for `tracing::Level::TRACE` events forwarded by the bridge layer
pub const TRACE_LEVEL_RANK: i32 = 5;

/// Filter used by the tracing bridge when `RUST_LOG` is not set
pub const DEFAULT_BRIDGE_FILTER: &str = "info";
