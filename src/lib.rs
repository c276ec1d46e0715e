//! # Logging Service - One Logger for the Whole Process
//!
//! Every module of a program asks the registry for the logger and gets the
//! same instance back. Level and destination changes made through any handle
//! apply to every holder, so diagnostic output stays consistent and can be
//! controlled from one place.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐  acquire   ┌─────────────────┐   emit    ┌─────────────────┐
//! │    Registry     │──────────► │     Logger      │─────────► │      Sinks      │
//! │                 │            │                 │           │                 │
//! │ • one instance  │            │ • level get/set │           │ • console       │
//! │ • force replace │            │ • destination   │           │ • plain file    │
//! │ • option tables │            │ • reconfigure   │           │ • rotating file │
//! └─────────────────┘            └─────────────────┘           └─────────────────┘
//!                                         ▲
//!                                         │
//!                                ┌─────────────────┐
//!                                │  tracing bridge │
//!                                │ (optional layer)│
//!                                └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logging_service::{registry, LoggerConfig, LogLevel};
//!
//! let log = registry::acquire(
//!     LoggerConfig::default()
//!         .with_level(LogLevel::Debug)
//!         .with_destination("/tmp/my_log.log"),
//!     false,
//! )?;
//!
//! log.info("Doing something...");
//! log.err("Something went wrong...");
//! log.warn("You shouldn't do this...");
//! log.debug("Adding numbers...");
//! log.critical("Save your work immediately...");
//! # Ok::<(), logging_service::LoggingError>(())
//! ```
//!
//! ## Late Configuration Is Ignored
//!
//! Because the logger is shared, only the first acquire (or a forced one)
//! applies its configuration. Later callers receive the existing logger as is;
//! they change it through [`Logger::set_level`] and
//! [`Logger::set_destination`], which affect every holder.
//!
//! ## Line Layout
//!
//! ```text
//! <prefix>(<pid>): <timestamp>;<LEVEL>: <message>
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod layer;
pub mod level;
pub mod registry;
pub mod service;
pub mod sink;

pub use config::{LoggerConfig, SinkConfig};
pub use error::{LoggingError, Result};
pub use layer::{init_tracing_bridge, SharedLoggerLayer};
pub use level::{level_to_int, level_value_to_int, LevelArg, LevelInfo, LogLevel};
pub use registry::{acquire, acquire_from_table, logger, Registry};
pub use service::Logger;
pub use sink::{CaptureBuffer, ConsoleSink, FileSink, RotatingFileSink, Sink, SinkKind};
