//! # Severity Levels
//!
//! The facade works with integer ranks so that callers can pass custom levels
//! that sit between the named ones (the tracing bridge uses rank 5 for TRACE).
//! The named levels keep the ranks of the platform logging convention:
//!
//! | level    | rank |
//! |----------|------|
//! | NOTSET   | 0    |
//! | DEBUG    | 10   |
//! | INFO     | 20   |
//! | WARN     | 30   |
//! | ERROR    | 40   |
//! | CRITICAL | 50   |
//!
//! A message is emitted when its rank is greater than or equal to the floor.

use crate::error::{LoggingError, Result};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Named severity levels, ordered by rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    NotSet,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::NotSet,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Stable integer rank
    pub const fn rank(self) -> i32 {
        match self {
            LogLevel::NotSet => 0,
            LogLevel::Debug => 10,
            LogLevel::Info => 20,
            LogLevel::Warn => 30,
            LogLevel::Error => 40,
            LogLevel::Critical => 50,
        }
    }

    /// Symbolic name as reported by the level getter
    pub const fn name(self) -> &'static str {
        match self {
            LogLevel::NotSet => "NOTSET",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Name printed in formatted lines.
    ///
    /// Differs from [`name`](Self::name) only for WARN, which the line layout
    /// spells `WARNING`.
    pub const fn record_name(self) -> &'static str {
        match self {
            LogLevel::Warn => "WARNING",
            other => other.name(),
        }
    }

    pub fn from_rank(rank: i32) -> Option<LogLevel> {
        LogLevel::ALL.into_iter().find(|level| level.rank() == rank)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTSET" => Ok(LogLevel::NotSet),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" | "ERR" => Ok(LogLevel::Error),
            "CRITICAL" | "FATAL" => Ok(LogLevel::Critical),
            _ => Err(LoggingError::InvalidArgument(format!(
                "unknown logging level name '{s}'"
            ))),
        }
    }
}

/// Level input: either a named level or a raw integer rank.
///
/// Raw integers are accepted without checking them against the named set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelArg {
    Named(LogLevel),
    Number(i32),
}

impl LevelArg {
    pub fn rank(self) -> i32 {
        level_to_int(self)
    }
}

impl Default for LevelArg {
    fn default() -> Self {
        LevelArg::Named(LogLevel::Info)
    }
}

impl From<LogLevel> for LevelArg {
    fn from(level: LogLevel) -> Self {
        LevelArg::Named(level)
    }
}

impl From<i32> for LevelArg {
    fn from(rank: i32) -> Self {
        LevelArg::Number(rank)
    }
}

impl FromStr for LevelArg {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(rank) = s.trim().parse::<i32>() {
            return Ok(LevelArg::Number(rank));
        }
        s.parse::<LogLevel>().map(LevelArg::Named)
    }
}

impl TryFrom<&str> for LevelArg {
    type Error = LoggingError;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl TryFrom<&toml::Value> for LevelArg {
    type Error = LoggingError;

    fn try_from(value: &toml::Value) -> Result<Self> {
        match value {
            toml::Value::Integer(rank) => i32::try_from(*rank)
                .map(LevelArg::Number)
                .map_err(|_| {
                    LoggingError::InvalidArgument(format!("logging level {rank} out of range"))
                }),
            toml::Value::String(name) => name.parse(),
            other => Err(LoggingError::InvalidArgument(format!(
                "logging level must be a level name or an integer, not {} '{}'",
                other.type_str(),
                other
            ))),
        }
    }
}

impl Serialize for LevelArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LevelArg::Named(level) => serializer.serialize_str(level.name()),
            LevelArg::Number(rank) => serializer.serialize_i32(*rank),
        }
    }
}

impl<'de> Deserialize<'de> for LevelArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = LevelArg;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a logging level name or an integer rank")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<LevelArg, E> {
                i32::try_from(v)
                    .map(LevelArg::Number)
                    .map_err(|_| E::custom(format!("logging level {v} out of range")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<LevelArg, E> {
                i32::try_from(v)
                    .map(LevelArg::Number)
                    .map_err(|_| E::custom(format!("logging level {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<LevelArg, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// Map a level argument to its integer rank.
pub fn level_to_int(level: impl Into<LevelArg>) -> i32 {
    match level.into() {
        LevelArg::Named(level) => level.rank(),
        LevelArg::Number(rank) => rank,
    }
}

/// Map a dynamically typed level (TOML value) to its integer rank.
///
/// Anything other than an integer or a recognised level name is rejected with
/// [`LoggingError::InvalidArgument`].
pub fn level_value_to_int(value: &toml::Value) -> Result<i32> {
    LevelArg::try_from(value).map(level_to_int)
}

/// Name printed in a formatted line for an arbitrary rank
pub fn record_name(rank: i32) -> Cow<'static, str> {
    match LogLevel::from_rank(rank) {
        Some(level) => Cow::Borrowed(level.record_name()),
        None => Cow::Owned(format!("Level {rank}")),
    }
}

/// Current level as reported by the facade's level getter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub number: i32,
    /// `None` when the floor is a custom integer rank
    pub name: Option<&'static str>,
}

impl LevelInfo {
    pub fn from_rank(rank: i32) -> Self {
        Self {
            number: rank,
            name: LogLevel::from_rank(rank).map(LogLevel::name),
        }
    }
}

impl From<LogLevel> for LevelInfo {
    fn from(level: LogLevel) -> Self {
        Self {
            number: level.rank(),
            name: Some(level.name()),
        }
    }
}

impl fmt::Display for LevelInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(name) => write!(f, "{name} ({})", self.number),
            None => write!(f, "Level {}", self.number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_are_ordered() {
        let ranks: Vec<i32> = LogLevel::ALL.iter().map(|l| l.rank()).collect();
        assert_eq!(ranks, vec![0, 10, 20, 30, 40, 50]);
        assert!(LogLevel::Debug < LogLevel::Critical);
    }

    #[test]
    fn test_warn_record_name() {
        assert_eq!(LogLevel::Warn.name(), "WARN");
        assert_eq!(LogLevel::Warn.record_name(), "WARNING");
        assert_eq!(record_name(40), "ERROR");
        assert_eq!(record_name(15), "Level 15");
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("err".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_to_int_passes_custom_ranks() {
        assert_eq!(level_to_int(LogLevel::Error), 40);
        assert_eq!(level_to_int(7), 7);
        assert_eq!(level_to_int(-3), -3);
    }

    #[test]
    fn test_level_value_to_int() {
        assert_eq!(level_value_to_int(&toml::Value::Integer(25)).unwrap(), 25);
        assert_eq!(
            level_value_to_int(&toml::Value::String("critical".into())).unwrap(),
            50
        );

        for bad in [
            toml::Value::Boolean(true),
            toml::Value::Float(1.5),
            toml::Value::String("loud".into()),
        ] {
            match level_value_to_int(&bad) {
                Err(LoggingError::InvalidArgument(_)) => {}
                other => panic!("expected InvalidArgument, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_level_info_for_custom_rank() {
        assert_eq!(
            LevelInfo::from_rank(10),
            LevelInfo {
                number: 10,
                name: Some("DEBUG")
            }
        );
        assert_eq!(LevelInfo::from_rank(12).name, None);
    }
}
