//! Core logging types, registries and the delivery engine

pub mod channel;
pub mod config;
pub mod error;
pub mod handle;
pub mod level_config;
pub mod log_level;
pub mod log_record;
pub mod metrics;
pub mod subsystem;
pub mod throttle;

pub use channel::LogChannel;
pub use config::LoggingConfig;
pub use error::{LoggerError, Result};
pub use handle::{log_msg, LogHandle, LogHandleBuilder, DEFAULT_LOCK_TIMEOUT, DEFAULT_LOG_LEVEL};
pub use level_config::LevelConfig;
pub use log_level::{loglevel_id, loglevel_name, LogLevel, LEVEL_NAMES};
pub use log_record::{HandleId, LogRecord, MAX_LOG_MSG_SIZE, RECORD_SIZE};
pub use metrics::DeliveryMetrics;
pub use subsystem::{
    is_valid_subsystem, subsystem_id, subsystem_name, subsystems, NameEntry, Subsystem,
    MAX_SUBSYSTEMS, SUBSYSTEM_NAMES,
};
pub use throttle::{Delivery, DeliveryEngine, ThrottleSnapshot, THROTTLE_FLOOR, UNTHROTTLE_AFTER};
