//! Coalesces repeated drop warnings into periodic summaries.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Default interval between dropped-line warnings.
pub const DEFAULT_WARN_INTERVAL: Duration = Duration::from_secs(5);

/// Counts dropped lines and reports them at most once per interval.
///
/// Callers bump the counter with [`record_drop`](Self::record_drop) and then
/// call [`warn_if_due`](Self::warn_if_due), which hands the pending count to
/// the callback when no summary has been emitted within the interval. The
/// first summary is always due.
pub struct RateLimitedWarner {
    interval: Duration,
    last_warn: Mutex<Option<Instant>>,
    pending: AtomicU64,
}

impl RateLimitedWarner {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_warn: Mutex::new(None),
            pending: AtomicU64::new(0),
        }
    }

    pub fn record_drop(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    /// Report pending drops when the interval has elapsed.
    pub fn warn_if_due(&self, warn: impl FnOnce(u64)) {
        let mut last = self.last_warn.lock();
        let now = Instant::now();
        if last.is_some_and(|at| now.duration_since(at) < self.interval) {
            return;
        }
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *last = Some(now);
        }
    }

    /// Report pending drops regardless of the interval.
    pub fn flush(&self, warn: impl FnOnce(u64)) {
        let mut last = self.last_warn.lock();
        let count = self.pending.swap(0, Ordering::Relaxed);
        if count > 0 {
            warn(count);
            *last = Some(Instant::now());
        }
    }

    /// Drops recorded but not yet reported.
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }
}

impl Default for RateLimitedWarner {
    fn default() -> Self {
        Self::new(DEFAULT_WARN_INTERVAL)
    }
}
