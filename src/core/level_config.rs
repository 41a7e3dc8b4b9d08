//! Per-handle verbosity ceilings, one slot per subsystem
//!
//! Administrative reads and writes go through a reader/writer lock with a
//! bounded wait. The logging path reads a slot without that lock: every slot
//! is an `AtomicU8`, so an unlocked read can observe a value that is about to
//! change but never a torn one.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::subsystem::{Subsystem, MAX_SUBSYSTEMS};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

pub struct LevelConfig {
    levels: [AtomicU8; MAX_SUBSYSTEMS],
    lock: RwLock<()>,
    lock_timeout: Duration,
}

impl LevelConfig {
    pub fn new(default_level: LogLevel, lock_timeout: Duration) -> Self {
        Self {
            levels: std::array::from_fn(|_| AtomicU8::new(default_level as u8)),
            lock: RwLock::new(()),
            lock_timeout,
        }
    }

    /// Store a ceiling for `subsystem`.
    ///
    /// Fails with an invalid-argument error for an unregistered subsystem or a
    /// level above DEBUG, and with [`LoggerError::LockAcquire`] when the write
    /// lock is not obtained within the configured timeout. On failure the
    /// stored value is unchanged.
    pub fn set(&self, subsystem: Subsystem, level: u8) -> Result<()> {
        let slot = Self::checked_slot(subsystem)?;
        let level = LogLevel::try_from(level)?;

        let _guard = self
            .lock
            .try_write_for(self.lock_timeout)
            .ok_or_else(|| LoggerError::lock_acquire("write", self.lock_timeout))?;
        self.levels[slot].store(level as u8, Ordering::Relaxed);
        Ok(())
    }

    pub fn get(&self, subsystem: Subsystem) -> Result<LogLevel> {
        let slot = Self::checked_slot(subsystem)?;

        let _guard = self
            .lock
            .try_read_for(self.lock_timeout)
            .ok_or_else(|| LoggerError::lock_acquire("read", self.lock_timeout))?;
        Ok(Self::decode(self.levels[slot].load(Ordering::Relaxed)))
    }

    /// Lock-free read for the logging path. `None` when `subsystem` addresses no slot.
    #[inline]
    pub fn ceiling(&self, subsystem: Subsystem) -> Option<LogLevel> {
        let slot = subsystem.slot()?;
        Some(Self::decode(self.levels[slot].load(Ordering::Relaxed)))
    }

    /// Hold the write lock; used to exercise lock contention
    #[cfg(test)]
    pub(crate) fn write_guard(&self) -> parking_lot::RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }

    fn checked_slot(subsystem: Subsystem) -> Result<usize> {
        if !subsystem.is_valid() {
            return Err(LoggerError::invalid_subsystem(subsystem.id()));
        }
        subsystem
            .slot()
            .ok_or_else(|| LoggerError::invalid_subsystem(subsystem.id()))
    }

    // slots only ever hold values that went through LogLevel::try_from
    fn decode(raw: u8) -> LogLevel {
        LogLevel::from_u8(raw).unwrap_or(LogLevel::Debug)
    }
}

impl std::fmt::Debug for LevelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for sub in super::subsystem::subsystems() {
            if let Some(level) = self.ceiling(sub) {
                map.entry(&sub.name(), &level);
            }
        }
        map.finish()
    }
}
