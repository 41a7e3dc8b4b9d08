//! Adaptive throttle and delivery engine
//!
//! Every record that passes the per-subsystem ceiling is handed to
//! [`DeliveryEngine::submit`], which decides whether it goes to the channel
//! now, is kept for one later retry, or is discarded. Two signals move a single
//! `threshold`:
//!
//! * sustained traffic above the threshold relaxes it by one step every
//!   [`UNTHROTTLE_AFTER`] rejected records;
//! * a complete write relaxes it by one step, a retry-later write outcome
//!   tightens it by one step, never below [`THROTTLE_FLOOR`].
//!
//! The engine itself is not synchronized; the owning handle keeps it behind a
//! mutex so exactly one record is in flight at a time. Channel writes are
//! non-blocking, so the critical section stays bounded.

use super::channel::LogChannel;
use super::log_level::LogLevel;
use super::log_record::LogRecord;
use super::metrics::DeliveryMetrics;
use std::io;
use std::sync::Arc;

/// Consecutive pre-gate rejections that unlock one more verbosity step
pub const UNTHROTTLE_AFTER: u32 = 40;

/// The threshold is never tightened past this level
pub const THROTTLE_FLOOR: LogLevel = LogLevel::Warning;

/// What the engine did with a submitted record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Rejected by the pre-gate
    Throttled,
    /// No channel attached
    Unrouted,
    /// All bytes written
    Delivered,
    /// Channel reported retry-later; `saved` tells whether the record was retained
    Deferred { saved: bool },
    /// Channel failed for another reason; the record is abandoned
    Failed,
}

/// Copy of the throttle state for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleSnapshot {
    pub threshold: LogLevel,
    pub dropped_count: u32,
    pub has_saved_record: bool,
}

#[derive(Debug)]
struct ThrottleState {
    threshold: LogLevel,
    dropped_count: u32,
    saved_record: Option<LogRecord>,
}

impl Default for ThrottleState {
    fn default() -> Self {
        Self {
            threshold: LogLevel::MOST_VERBOSE,
            dropped_count: 0,
            saved_record: None,
        }
    }
}

pub struct DeliveryEngine {
    state: ThrottleState,
    channel: Option<Box<dyn LogChannel>>,
    metrics: Arc<DeliveryMetrics>,
}

impl DeliveryEngine {
    pub fn new(channel: Option<Box<dyn LogChannel>>, metrics: Arc<DeliveryMetrics>) -> Self {
        Self {
            state: ThrottleState::default(),
            channel,
            metrics,
        }
    }

    /// Attach a channel, returning the previous one
    pub fn set_channel(&mut self, channel: Box<dyn LogChannel>) -> Option<Box<dyn LogChannel>> {
        self.channel.replace(channel)
    }

    /// Detach the channel; later records are lost until a new one is attached
    pub fn take_channel(&mut self) -> Option<Box<dyn LogChannel>> {
        self.channel.take()
    }

    pub fn has_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn snapshot(&self) -> ThrottleSnapshot {
        ThrottleSnapshot {
            threshold: self.state.threshold,
            dropped_count: self.state.dropped_count,
            has_saved_record: self.state.saved_record.is_some(),
        }
    }

    pub fn submit(&mut self, record: LogRecord) -> Delivery {
        let state = &mut self.state;

        if record.level > state.threshold {
            // Unthrottle after 40 messages in case it is all low-priority traffic
            state.dropped_count += 1;
            if state.dropped_count < UNTHROTTLE_AFTER {
                self.metrics.record_throttled();
                return Delivery::Throttled;
            }
            state.threshold = state.threshold.more_verbose();
            state.dropped_count = 0;
        }

        let Some(channel) = self.channel.as_mut() else {
            self.metrics.record_unrouted();
            return Delivery::Unrouted;
        };

        // One best-effort retry of the retained record; it is gone either way
        if let Some(saved) = state.saved_record.take() {
            self.metrics.record_replayed();
            let _ = write_record(&mut **channel, &saved.encode());
        }

        match write_record(&mut **channel, &record.encode()) {
            Ok(()) => {
                state.threshold = state.threshold.more_verbose();
                self.metrics.record_delivered();
                Delivery::Delivered
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                let saved = record.level < state.threshold;
                if saved {
                    state.saved_record = Some(record);
                    self.metrics.record_saved();
                }
                if state.threshold > THROTTLE_FLOOR {
                    state.threshold = state.threshold.less_verbose();
                }
                self.metrics.record_deferred();
                Delivery::Deferred { saved }
            }
            Err(_) => {
                self.metrics.record_failed();
                Delivery::Failed
            }
        }
    }
}

/// Write one encoded record, resuming partial writes by byte count.
///
/// Returns the first error that is not an interruption; retry-later outcomes
/// are returned, not waited on.
fn write_record(channel: &mut dyn LogChannel, bytes: &[u8]) -> io::Result<()> {
    let mut written = 0;
    while written < bytes.len() {
        match channel.try_write(&bytes[written..]) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
