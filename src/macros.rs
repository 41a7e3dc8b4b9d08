//! Logging macros for ergonomic message formatting.
//!
//! The macros check the subsystem's ceiling before formatting, so a message
//! that is gated out costs one atomic load.
//!
//! # Examples
//!
//! ```
//! use cluster_logging::prelude::*;
//! use cluster_logging::{log_debug, log_info};
//!
//! let handle = LogHandle::new();
//!
//! log_info!(handle, Subsystem::LISTENER, "listener started");
//!
//! let port = 5405;
//! log_debug!(handle, Subsystem::TRANSP_UDP, "bound to port {}", port);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use cluster_logging::prelude::*;
/// # let handle = LogHandle::new();
/// use cluster_logging::log_msg;
/// log_msg!(handle, Subsystem::HOST, LogLevel::Info, "host {} joined", 4);
/// ```
#[macro_export]
macro_rules! log_msg {
    ($handle:expr, $subsystem:expr, $level:expr, $($arg:tt)+) => {{
        let handle: &$crate::LogHandle = &$handle;
        let subsystem: $crate::Subsystem = $subsystem;
        let level: $crate::LogLevel = $level;
        if handle.is_enabled(subsystem, level) {
            let _ = handle.deliver(subsystem, level, format_args!($($arg)+));
        }
    }};
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use cluster_logging::prelude::*;
/// # let handle = LogHandle::new();
/// use cluster_logging::log_err;
/// log_err!(handle, Subsystem::CRYPTO, "Unable to load crypto library");
/// ```
#[macro_export]
macro_rules! log_err {
    ($handle:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::log_msg!($handle, $subsystem, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! log_warn {
    ($handle:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::log_msg!($handle, $subsystem, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! log_info {
    ($handle:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::log_msg!($handle, $subsystem, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use cluster_logging::prelude::*;
/// # let handle = LogHandle::new();
/// use cluster_logging::log_debug;
/// log_debug!(handle, Subsystem::PMTUD, "probing mtu {}", 1500);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($handle:expr, $subsystem:expr, $($arg:tt)+) => {
        $crate::log_msg!($handle, $subsystem, $crate::LogLevel::Debug, $($arg)+)
    };
}
