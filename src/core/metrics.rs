//! Delivery metrics for observability
//!
//! Counters describing what the throttle engine did with each submitted
//! record. All counters use relaxed atomics and can be read without taking
//! the engine lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for log delivery
///
/// # Example
///
/// ```
/// use cluster_logging::DeliveryMetrics;
///
/// let metrics = DeliveryMetrics::new();
/// metrics.record_delivered();
/// metrics.record_throttled();
///
/// assert_eq!(metrics.delivered(), 1);
/// assert_eq!(metrics.throttled(), 1);
/// ```
#[derive(Debug)]
pub struct DeliveryMetrics {
    /// Records fully written to the channel
    delivered: AtomicU64,

    /// Records discarded by the throttle pre-gate
    throttled: AtomicU64,

    /// Writes that hit a retry-later outcome
    deferred: AtomicU64,

    /// Records retained for one later retry
    saved: AtomicU64,

    /// Retry attempts of a retained record
    replayed: AtomicU64,

    /// Writes abandoned on a non-retryable error
    failed: AtomicU64,

    /// Records that reached the engine while no channel was attached
    unrouted: AtomicU64,
}

impl DeliveryMetrics {
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU64::new(0),
            throttled: AtomicU64::new(0),
            deferred: AtomicU64::new(0),
            saved: AtomicU64::new(0),
            replayed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            unrouted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn throttled(&self) -> u64 {
        self.throttled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn deferred(&self) -> u64 {
        self.deferred.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn saved(&self) -> u64 {
        self.saved.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn replayed(&self) -> u64 {
        self.replayed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn unrouted(&self) -> u64 {
        self.unrouted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_throttled(&self) -> u64 {
        self.throttled.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_deferred(&self) -> u64 {
        self.deferred.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_saved(&self) -> u64 {
        self.saved.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_replayed(&self) -> u64 {
        self.replayed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unrouted(&self) -> u64 {
        self.unrouted.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of records that reached the engine but were not delivered,
    /// as a percentage (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been submitted.
    pub fn loss_rate(&self) -> f64 {
        let delivered = self.delivered() as f64;
        let lost = (self.throttled() + self.deferred() + self.failed() + self.unrouted()) as f64;
        let total = delivered + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.delivered.store(0, Ordering::Relaxed);
        self.throttled.store(0, Ordering::Relaxed);
        self.deferred.store(0, Ordering::Relaxed);
        self.saved.store(0, Ordering::Relaxed);
        self.replayed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.unrouted.store(0, Ordering::Relaxed);
    }
}

impl Default for DeliveryMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DeliveryMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            delivered: AtomicU64::new(self.delivered()),
            throttled: AtomicU64::new(self.throttled()),
            deferred: AtomicU64::new(self.deferred()),
            saved: AtomicU64::new(self.saved()),
            replayed: AtomicU64::new(self.replayed()),
            failed: AtomicU64::new(self.failed()),
            unrouted: AtomicU64::new(self.unrouted()),
        }
    }
}
