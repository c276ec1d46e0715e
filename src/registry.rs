//! # Singleton Registry
//!
//! Hands out the one shared [`Logger`] of the process.
//!
//! ## Contract
//!
//! - The first [`acquire`](Registry::acquire) builds the logger from its
//!   configuration and stores it.
//! - Later calls without `force` return the stored logger and **ignore their
//!   configuration entirely**. A module asking for DEBUG after another module
//!   created the logger at INFO still gets the INFO logger; use
//!   [`Logger::set_level`] to change it for everyone.
//! - A call with `force` builds a brand-new logger and stores it in place of
//!   the old one. Handles issued earlier keep pointing at the old state and
//!   keep working against it; they are not migrated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use logging_service::{registry, LoggerConfig, LogLevel};
//!
//! let log = registry::acquire(LoggerConfig::default().with_level(LogLevel::Debug), false)?;
//! log.info("Doing something...");
//!
//! // Elsewhere in the program: same logger, configuration ignored
//! let same = registry::logger()?;
//! assert!(same.ptr_eq(&log));
//! # Ok::<(), logging_service::LoggingError>(())
//! ```

use crate::config::LoggerConfig;
use crate::error::Result;
use crate::service::Logger;
use once_cell::sync::Lazy;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Holder of at most one live logger
#[derive(Default)]
pub struct Registry {
    slot: Mutex<Option<Logger>>,
}

impl Registry {
    /// An empty registry, independent of the process-wide one
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Logger>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the stored logger, creating it from `config` when there is none
    /// or when `force` is set.
    ///
    /// The slot stays locked while a logger is built, so concurrent first
    /// callers still end up with a single instance.
    pub fn acquire(&self, config: LoggerConfig, force: bool) -> Result<Logger> {
        let mut slot = self.lock();

        if let Some(existing) = slot.as_ref().filter(|_| !force) {
            return Ok(existing.clone());
        }

        let replacing = slot.is_some();
        let logger = Logger::new(config)?;
        *slot = Some(logger.clone());
        drop(slot);

        if replacing {
            debug!(logger = %logger.name(), "forced replacement of shared logger");
        }
        Ok(logger)
    }

    /// Acquire with a keyword-style option table.
    ///
    /// `force` is read from the table; a non-boolean value is rejected with
    /// [`LoggingError::InvalidArgument`](crate::LoggingError::InvalidArgument)
    /// before anything else happens.
    pub fn acquire_from_table(&self, options: &toml::Table) -> Result<Logger> {
        let (config, force) = LoggerConfig::from_table(options)?;
        self.acquire(config, force)
    }

    /// The stored logger, if one was created
    pub fn current(&self) -> Option<Logger> {
        self.lock().clone()
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// [`Registry::acquire`] on the process-wide registry
pub fn acquire(config: LoggerConfig, force: bool) -> Result<Logger> {
    global().acquire(config, force)
}

/// [`Registry::acquire_from_table`] on the process-wide registry
pub fn acquire_from_table(options: &toml::Table) -> Result<Logger> {
    global().acquire_from_table(options)
}

/// The shared logger, created with default settings if nobody created it yet
pub fn logger() -> Result<Logger> {
    acquire(LoggerConfig::default(), false)
}

/// The shared logger, if one exists
pub fn current() -> Option<Logger> {
    global().current()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{LevelInfo, LogLevel};

    #[test]
    fn test_first_acquire_uses_config() {
        let registry = Registry::new();
        assert!(registry.current().is_none());

        let log = registry
            .acquire(LoggerConfig::default().with_level(LogLevel::Warn), false)
            .unwrap();
        assert_eq!(log.level(), LevelInfo::from(LogLevel::Warn));
        assert!(registry.current().unwrap().ptr_eq(&log));
    }

    #[test]
    fn test_later_config_is_ignored() {
        let registry = Registry::new();
        let first = registry.acquire(LoggerConfig::default(), false).unwrap();
        let second = registry
            .acquire(
                LoggerConfig::default()
                    .with_level(LogLevel::Debug)
                    .with_name("other"),
                false,
            )
            .unwrap();

        assert!(first.ptr_eq(&second));
        assert_eq!(second.level(), LevelInfo::from(LogLevel::Info));
        assert_eq!(second.name(), "logging_service");
    }

    #[test]
    fn test_force_replaces_instance() {
        let registry = Registry::new();
        let old = registry.acquire(LoggerConfig::default(), false).unwrap();
        let new = registry
            .acquire(LoggerConfig::default().with_level(LogLevel::Error), true)
            .unwrap();

        assert!(!old.ptr_eq(&new));
        assert_eq!(old.level(), LevelInfo::from(LogLevel::Info));
        assert_eq!(new.level(), LevelInfo::from(LogLevel::Error));
        assert!(registry.current().unwrap().ptr_eq(&new));
    }
}
