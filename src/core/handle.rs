//! Log handle: configuration, throttle engine and the logging entry point

use super::{
    channel::LogChannel,
    error::{LoggerError, Result},
    level_config::LevelConfig,
    log_level::LogLevel,
    log_record::{HandleId, LogRecord},
    metrics::DeliveryMetrics,
    subsystem::Subsystem,
    throttle::{Delivery, DeliveryEngine, ThrottleSnapshot},
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default bound on waits for the configuration lock (1 second)
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Default ceiling for every subsystem of a new handle
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

/// Owner of one independent logging pipeline.
///
/// Each handle carries its own level table, throttle state and channel;
/// handles never share delivery state.
pub struct LogHandle {
    id: HandleId,
    levels: LevelConfig,
    engine: Mutex<DeliveryEngine>,
    metrics: Arc<DeliveryMetrics>,
}

impl LogHandle {
    /// Handle with default ceilings and no channel
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(DEFAULT_LOG_LEVEL, DEFAULT_LOCK_TIMEOUT, None)
    }

    fn with_parts(
        default_level: LogLevel,
        lock_timeout: Duration,
        channel: Option<Box<dyn LogChannel>>,
    ) -> Self {
        let metrics = Arc::new(DeliveryMetrics::new());
        Self {
            id: HandleId::next(),
            levels: LevelConfig::new(default_level, lock_timeout),
            engine: Mutex::new(DeliveryEngine::new(channel, Arc::clone(&metrics))),
            metrics,
        }
    }

    /// Create a builder for LogHandle
    ///
    /// # Example
    /// ```
    /// use cluster_logging::prelude::*;
    ///
    /// let handle = LogHandle::builder()
    ///     .default_level(LogLevel::Warning)
    ///     .level(Subsystem::TRANSPORT, LogLevel::Debug)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(handle.get_level(Subsystem::TRANSPORT).unwrap(), LogLevel::Debug);
    /// ```
    #[must_use]
    pub fn builder() -> LogHandleBuilder {
        LogHandleBuilder::new()
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Set the verbosity ceiling of `subsystem`.
    ///
    /// `level` accepts a [`LogLevel`] or a raw level id; ids above DEBUG are
    /// rejected. A lock timeout is reported to the caller and also logged
    /// through this handle.
    pub fn set_level(&self, subsystem: Subsystem, level: impl Into<u8>) -> Result<()> {
        let result = self.levels.set(subsystem, level.into());
        if let Err(err @ LoggerError::LockAcquire { .. }) = &result {
            self.log_fmt(
                subsystem,
                LogLevel::Error,
                format_args!("Unable to get write lock: {}", err),
            );
        }
        result
    }

    pub fn get_level(&self, subsystem: Subsystem) -> Result<LogLevel> {
        let result = self.levels.get(subsystem);
        if let Err(err @ LoggerError::LockAcquire { .. }) = &result {
            self.log_fmt(
                subsystem,
                LogLevel::Error,
                format_args!("Unable to get read lock: {}", err),
            );
        }
        result
    }

    /// Attach a channel, returning the one it replaces
    pub fn set_channel(&self, channel: impl LogChannel + 'static) -> Option<Box<dyn LogChannel>> {
        self.engine.lock().set_channel(Box::new(channel))
    }

    /// Detach the channel; records are dropped until a new one is attached
    pub fn clear_channel(&self) -> Option<Box<dyn LogChannel>> {
        self.engine.lock().take_channel()
    }

    pub fn has_channel(&self) -> bool {
        self.engine.lock().has_channel()
    }

    /// Whether a record for `subsystem` at `level` would reach the throttle engine.
    ///
    /// Reads the configured ceiling without taking the configuration lock.
    #[inline]
    pub fn is_enabled(&self, subsystem: Subsystem, level: LogLevel) -> bool {
        if subsystem == Subsystem::UNKNOWN {
            return false;
        }
        match self.levels.ceiling(subsystem) {
            Some(ceiling) => level <= ceiling,
            None => false,
        }
    }

    /// Log a preformatted message
    #[inline]
    pub fn log(&self, subsystem: Subsystem, level: LogLevel, message: impl AsRef<str>) {
        self.log_fmt(subsystem, level, format_args!("{}", message.as_ref()));
    }

    /// Log a message, formatting it only if it passes the ceiling
    pub fn log_fmt(&self, subsystem: Subsystem, level: LogLevel, args: fmt::Arguments<'_>) {
        let _ = self.submit(subsystem, level, args);
    }

    /// Gate, build and submit one record, reporting what became of it.
    ///
    /// `None` means the record was gated out before reaching the engine.
    pub fn submit(
        &self,
        subsystem: Subsystem,
        level: LogLevel,
        args: fmt::Arguments<'_>,
    ) -> Option<Delivery> {
        if !self.is_enabled(subsystem, level) {
            return None;
        }
        Some(self.deliver(subsystem, level, args))
    }

    /// Build and submit one record without consulting the ceiling.
    ///
    /// Used by the logging macros after their own `is_enabled` check, so a
    /// passing record loads its ceiling once.
    #[doc(hidden)]
    pub fn deliver(
        &self,
        subsystem: Subsystem,
        level: LogLevel,
        args: fmt::Arguments<'_>,
    ) -> Delivery {
        let mut engine = self.engine.lock();
        let record = LogRecord::new(subsystem, level, self.id, args);
        engine.submit(record)
    }

    /// Copy of the current throttle state
    pub fn throttle_snapshot(&self) -> ThrottleSnapshot {
        self.engine.lock().snapshot()
    }

    /// Delivery counters for this handle
    ///
    /// # Example
    ///
    /// ```
    /// use cluster_logging::prelude::*;
    ///
    /// let handle = LogHandle::new();
    /// handle.log(Subsystem::HOST, LogLevel::Error, "no channel attached");
    ///
    /// assert_eq!(handle.metrics().unrouted(), 1);
    /// ```
    pub fn metrics(&self) -> &DeliveryMetrics {
        &self.metrics
    }
}

impl Default for LogHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogHandle")
            .field("id", &self.id)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

/// Entry point for callers that may not hold a handle.
///
/// A no-op when `handle` is `None`, when `subsystem` is the "no subsystem"
/// sentinel, or when `level` exceeds the subsystem's configured ceiling.
pub fn log_msg(
    handle: Option<&LogHandle>,
    subsystem: Subsystem,
    level: LogLevel,
    args: fmt::Arguments<'_>,
) {
    if let Some(handle) = handle {
        handle.log_fmt(subsystem, level, args);
    }
}

/// Builder for constructing LogHandle with a fluent API
///
/// # Example
/// ```
/// use cluster_logging::prelude::*;
/// use cluster_logging::channels::MemoryChannel;
/// use std::time::Duration;
///
/// let (channel, reader) = MemoryChannel::bounded(64 * 1024);
/// let handle = LogHandle::builder()
///     .default_level(LogLevel::Warning)
///     .level(Subsystem::HEARTBEAT, LogLevel::Debug)
///     .lock_timeout(Duration::from_millis(200))
///     .channel(channel)
///     .build()
///     .unwrap();
///
/// handle.log(Subsystem::HEARTBEAT, LogLevel::Debug, "ping");
/// assert_eq!(reader.take_records().len(), 1);
/// ```
pub struct LogHandleBuilder {
    default_level: LogLevel,
    levels: Vec<(Subsystem, u8)>,
    lock_timeout: Duration,
    channel: Option<Box<dyn LogChannel>>,
}

impl LogHandleBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            default_level: DEFAULT_LOG_LEVEL,
            levels: Vec::new(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            channel: None,
        }
    }

    /// Ceiling applied to every subsystem before overrides
    #[must_use = "builder methods return a new value"]
    pub fn default_level(mut self, level: LogLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Override the ceiling of one subsystem; validated in [`build`](Self::build)
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, subsystem: Subsystem, level: impl Into<u8>) -> Self {
        self.levels.push((subsystem, level.into()));
        self
    }

    /// Bound on waits for the configuration lock
    #[must_use = "builder methods return a new value"]
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn channel<C: LogChannel + 'static>(mut self, channel: C) -> Self {
        self.channel = Some(Box::new(channel));
        self
    }

    /// Build the LogHandle, rejecting invalid level overrides
    pub fn build(self) -> Result<LogHandle> {
        let handle = LogHandle::with_parts(self.default_level, self.lock_timeout, self.channel);
        for (subsystem, level) in self.levels {
            handle.levels.set(subsystem, level)?;
        }
        Ok(handle)
    }
}

impl Default for LogHandleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::MemoryChannel;
    use crate::core::throttle::UNTHROTTLE_AFTER;

    fn handle_with_memory() -> (LogHandle, crate::channels::MemoryChannelReader) {
        let (channel, reader) = MemoryChannel::bounded(1024 * 1024);
        let handle = LogHandle::builder().channel(channel).build().unwrap();
        (handle, reader)
    }

    #[test]
    fn test_builder_defaults() {
        let handle = LogHandle::builder().build().unwrap();
        assert_eq!(handle.get_level(Subsystem::COMMON).unwrap(), DEFAULT_LOG_LEVEL);
        assert!(!handle.has_channel());
        assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Debug);
    }

    #[test]
    fn test_builder_rejects_bad_override() {
        let err = LogHandle::builder()
            .level(Subsystem::LINK, 9u8)
            .build()
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = LogHandle::builder()
            .level(Subsystem(42), LogLevel::Debug)
            .build()
            .unwrap_err();
        assert!(matches!(err, LoggerError::InvalidSubsystem { id: 42 }));
    }

    #[test]
    fn test_handles_are_independent() {
        let a = LogHandle::new();
        let b = LogHandle::new();
        assert_ne!(a.id(), b.id());

        a.set_level(Subsystem::TX, LogLevel::Debug).unwrap();
        assert_eq!(b.get_level(Subsystem::TX).unwrap(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_set_level_rejects_above_debug() {
        let handle = LogHandle::new();
        handle.set_level(Subsystem::RX, LogLevel::Warning).unwrap();
        let err = handle.set_level(Subsystem::RX, 4u8).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidLevel { level: 4 }));
        assert_eq!(handle.get_level(Subsystem::RX).unwrap(), LogLevel::Warning);
    }

    #[test]
    fn test_gate_uses_configured_ceiling() {
        let (handle, reader) = handle_with_memory();
        handle.set_level(Subsystem::LINK, LogLevel::Info).unwrap();

        let outcome = handle.submit(Subsystem::LINK, LogLevel::Debug, format_args!("hidden"));
        assert_eq!(outcome, None);
        assert!(reader.take_records().is_empty());

        let outcome = handle.submit(Subsystem::LINK, LogLevel::Info, format_args!("shown"));
        assert_eq!(outcome, Some(Delivery::Delivered));
        let records = reader.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "shown");
        assert_eq!(records[0].subsystem, Subsystem::LINK);
        assert_eq!(records[0].handle, handle.id());
    }

    #[test]
    fn test_deliver_bypasses_ceiling() {
        let (handle, reader) = handle_with_memory();
        handle.set_level(Subsystem::LINK, LogLevel::Error).unwrap();

        let outcome = handle.deliver(Subsystem::LINK, LogLevel::Debug, format_args!("forced"));
        assert_eq!(outcome, Delivery::Delivered);
        let records = reader.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "forced");
        assert_eq!(handle.metrics().delivered(), 1);
    }

    #[test]
    fn test_sentinel_and_out_of_table_subsystems_are_ignored() {
        let (handle, reader) = handle_with_memory();
        handle.log(Subsystem::UNKNOWN, LogLevel::Error, "no subsystem");
        handle.log(Subsystem(255), LogLevel::Error, "no slot");
        assert!(reader.take_records().is_empty());
        assert_eq!(handle.metrics().delivered(), 0);
    }

    #[test]
    fn test_log_msg_without_handle_is_noop() {
        log_msg(None, Subsystem::HOST, LogLevel::Error, format_args!("dropped"));

        let (handle, reader) = handle_with_memory();
        log_msg(Some(&handle), Subsystem::HOST, LogLevel::Error, format_args!("kept {}", 1));
        assert_eq!(reader.take_records()[0].message(), "kept 1");
    }

    #[test]
    fn test_lock_timeout_is_logged_through_handle() {
        let (channel, reader) = MemoryChannel::bounded(64 * 1024);
        let handle = LogHandle::builder()
            .lock_timeout(Duration::from_millis(10))
            .channel(channel)
            .build()
            .unwrap();

        let guard = handle.levels.write_guard();
        let err = handle.set_level(Subsystem::CRYPTO, LogLevel::Debug).unwrap_err();
        drop(guard);

        assert!(matches!(err, LoggerError::LockAcquire { .. }));
        let records = reader.take_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, LogLevel::Error);
        assert!(records[0].message().starts_with("Unable to get write lock"));
        assert_eq!(handle.get_level(Subsystem::CRYPTO).unwrap(), LogLevel::Info);
    }

    #[test]
    fn test_clear_channel_keeps_throttle_state() {
        let (channel, _reader) = MemoryChannel::bounded(1);
        let handle = LogHandle::builder().channel(channel).build().unwrap();
        handle.log(Subsystem::HOST, LogLevel::Error, "blocked");
        let before = handle.throttle_snapshot();
        assert!(before.has_saved_record);

        assert!(handle.clear_channel().is_some());
        assert_eq!(handle.throttle_snapshot(), before);
        handle.log(Subsystem::HOST, LogLevel::Error, "lost");
        assert_eq!(handle.metrics().unrouted(), 1);
    }

    #[test]
    fn test_unthrottle_through_entry_point() {
        let (channel, reader) = MemoryChannel::bounded(1);
        let handle = LogHandle::builder()
            .default_level(LogLevel::Debug)
            .channel(channel)
            .build()
            .unwrap();

        // two blocked writes tighten Debug -> Info -> Warning
        handle.log(Subsystem::TX, LogLevel::Warning, "a");
        handle.log(Subsystem::TX, LogLevel::Warning, "b");
        assert_eq!(handle.throttle_snapshot().threshold, LogLevel::Warning);

        for _ in 0..UNTHROTTLE_AFTER - 1 {
            handle.log(Subsystem::TX, LogLevel::Debug, "noise");
        }
        assert_eq!(handle.throttle_snapshot().dropped_count, UNTHROTTLE_AFTER - 1);
        assert_eq!(handle.metrics().throttled(), u64::from(UNTHROTTLE_AFTER - 1));
        assert!(reader.take_records().is_empty());
    }
}
