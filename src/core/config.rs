//! Serializable logging configuration
//!
//! ```json
//! {
//!   "default_level": "warning",
//!   "subsystems": { "transport": "debug", "crypto": "error" },
//!   "lock_timeout_ms": 500
//! }
//! ```
//!
//! Subsystem and level names resolve through the registries, case-insensitively.
//! Unlike the registry lookups, unknown names are rejected rather than mapped
//! to a fallback id.

use super::error::{LoggerError, Result};
use super::handle::{LogHandleBuilder, DEFAULT_LOCK_TIMEOUT};
use super::log_level::LogLevel;
use super::subsystem::{subsystem_id, Subsystem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub default_level: String,
    pub subsystems: BTreeMap<String, String>,
    pub lock_timeout_ms: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_level: LogLevel::default().to_str().to_string(),
            subsystems: BTreeMap::new(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
        }
    }
}

impl LoggingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolved `(subsystem, level)` overrides in name order
    pub fn resolved_levels(&self) -> Result<Vec<(Subsystem, LogLevel)>> {
        self.subsystems
            .iter()
            .map(|(name, level)| {
                let id = subsystem_id(name);
                if id == Subsystem::UNKNOWN.id() {
                    return Err(LoggerError::config(
                        "subsystems",
                        format!("unknown subsystem '{}'", name),
                    ));
                }
                let level = level.parse::<LogLevel>().map_err(|_| {
                    LoggerError::config(
                        "subsystems",
                        format!("unknown level '{}' for subsystem '{}'", level, name),
                    )
                })?;
                Ok((Subsystem(id), level))
            })
            .collect()
    }

    /// Builder preloaded with this configuration; attach a channel before building
    pub fn to_builder(&self) -> Result<LogHandleBuilder> {
        let default_level = self.default_level.parse::<LogLevel>().map_err(|_| {
            LoggerError::config(
                "default_level",
                format!("unknown level '{}'", self.default_level),
            )
        })?;
        if self.lock_timeout_ms == 0 {
            return Err(LoggerError::config("lock_timeout_ms", "must be greater than zero"));
        }

        let mut builder = LogHandleBuilder::new()
            .default_level(default_level)
            .lock_timeout(Duration::from_millis(self.lock_timeout_ms));
        for (subsystem, level) in self.resolved_levels()? {
            builder = builder.level(subsystem, level);
        }
        Ok(builder)
    }
}
