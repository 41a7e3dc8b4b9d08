//! # Cluster Logging
//!
//! Non-blocking log delivery for a cluster communication engine.
//!
//! ## Features
//!
//! - **Never blocks the caller**: records go to a non-blocking channel under a
//!   short, bounded critical section
//! - **Adaptive throttling**: a per-handle threshold tracks consumer health,
//!   trading low-priority completeness for latency without ever discarding
//!   errors and warnings for good
//! - **Addressable filtering**: per-subsystem verbosity ceilings with name
//!   registries for configuration and diagnostics
//! - **Fixed-size records**: a constant wire size lets consumers and partial
//!   writes work by byte count

pub mod channels;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::channels::{LogReader, MemoryChannel, ReceivedRecord};
    pub use crate::core::{
        log_msg, Delivery, DeliveryMetrics, HandleId, LogChannel, LogHandle, LogHandleBuilder,
        LogLevel, LogRecord, LoggerError, LoggingConfig, Result, Subsystem, ThrottleSnapshot,
    };
}

pub use crate::channels::{LogReader, MemoryChannel, MemoryChannelReader, ReceivedRecord};
pub use crate::core::{
    is_valid_subsystem, log_msg, loglevel_id, loglevel_name, subsystem_id, subsystem_name,
    Delivery, DeliveryMetrics, HandleId, LogChannel, LogHandle, LogHandleBuilder, LogLevel,
    LogRecord, LoggerError, LoggingConfig, Result, Subsystem, ThrottleSnapshot,
    DEFAULT_LOCK_TIMEOUT, MAX_LOG_MSG_SIZE, RECORD_SIZE, THROTTLE_FLOOR, UNTHROTTLE_AFTER,
};
