//! Severity levels and the level name registry
//!
//! Levels are ordered by increasing verbosity: `Error < Warning < Info < Debug`.
//! A message passes a ceiling when `message_level <= ceiling`.

use super::error::{LoggerError, Result};
use super::subsystem::NameEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    #[default]
    Info = 2,
    Debug = 3,
}

/// Level names indexed by level id. Stored casing is part of the public contract.
pub const LEVEL_NAMES: [NameEntry; 4] = [
    NameEntry::new("ERROR", LogLevel::Error as u8),
    NameEntry::new("WARNING", LogLevel::Warning as u8),
    NameEntry::new("info", LogLevel::Info as u8),
    NameEntry::new("debug", LogLevel::Debug as u8),
];

/// Name for a level id. Unknown ids yield the literal `"ERROR"`.
pub fn loglevel_name(level: u8) -> &'static str {
    match LEVEL_NAMES.get(level as usize) {
        Some(entry) => entry.name,
        None => "ERROR",
    }
}

/// Case-insensitive lookup of a level id by name. Unknown names yield ERROR's id.
pub fn loglevel_id(name: &str) -> u8 {
    LEVEL_NAMES
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map_or(LogLevel::Error as u8, |entry| entry.id)
}

impl LogLevel {
    pub const MOST_VERBOSE: LogLevel = LogLevel::Debug;

    pub fn from_u8(level: u8) -> Option<Self> {
        match level {
            0 => Some(LogLevel::Error),
            1 => Some(LogLevel::Warning),
            2 => Some(LogLevel::Info),
            3 => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Registry name of this level
    pub fn to_str(&self) -> &'static str {
        LEVEL_NAMES[*self as usize].name
    }

    /// One step more verbose, saturating at DEBUG
    #[must_use]
    pub fn more_verbose(self) -> Self {
        Self::from_u8(self as u8 + 1).unwrap_or(LogLevel::MOST_VERBOSE)
    }

    /// One step less verbose, saturating at ERROR
    #[must_use]
    pub fn less_verbose(self) -> Self {
        match self {
            LogLevel::Error => LogLevel::Error,
            other => Self::from_u8(other as u8 - 1).unwrap_or(LogLevel::Error),
        }
    }
}

impl From<LogLevel> for u8 {
    fn from(level: LogLevel) -> u8 {
        level as u8
    }
}

impl TryFrom<u8> for LogLevel {
    type Error = LoggerError;

    fn try_from(level: u8) -> Result<Self> {
        LogLevel::from_u8(level).ok_or_else(|| LoggerError::invalid_level(level))
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Strict parse: unlike [`loglevel_id`], unknown names are rejected.
impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        LEVEL_NAMES
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(s))
            .and_then(|entry| LogLevel::from_u8(entry.id))
            .ok_or_else(|| LoggerError::config("log level", format!("unknown level name '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering_is_verbosity() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_default_level_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
        assert_eq!(u8::from(LogLevel::default()), 2);
    }

    #[test]
    fn test_name_lookup_keeps_stored_casing() {
        assert_eq!(loglevel_name(0), "ERROR");
        assert_eq!(loglevel_name(1), "WARNING");
        assert_eq!(loglevel_name(2), "info");
        assert_eq!(loglevel_name(3), "debug");
    }

    #[test]
    fn test_unknown_id_falls_back_to_error_literal() {
        assert_eq!(loglevel_name(4), "ERROR");
        assert_eq!(loglevel_name(255), "ERROR");
    }

    #[test]
    fn test_id_lookup_is_case_insensitive() {
        assert_eq!(loglevel_id("DEBUG"), 3);
        assert_eq!(loglevel_id("Info"), 2);
        assert_eq!(loglevel_id("warning"), 1);
        assert_eq!(loglevel_id("error"), 0);
    }

    #[test]
    fn test_unknown_name_falls_back_to_error_id() {
        assert_eq!(loglevel_id("trace"), 0);
        assert_eq!(loglevel_id(""), 0);
        assert_eq!(loglevel_id("warn"), 0);
    }

    #[test]
    fn test_step_saturation() {
        assert_eq!(LogLevel::Debug.more_verbose(), LogLevel::Debug);
        assert_eq!(LogLevel::Info.more_verbose(), LogLevel::Debug);
        assert_eq!(LogLevel::Error.less_verbose(), LogLevel::Error);
        assert_eq!(LogLevel::Warning.less_verbose(), LogLevel::Error);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warning);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(LogLevel::try_from(2).unwrap(), LogLevel::Info);
        assert!(matches!(
            LogLevel::try_from(4),
            Err(LoggerError::InvalidLevel { level: 4 })
        ));
    }
}
