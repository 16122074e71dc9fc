//! Rate-limited warning helper for lines the provider discards.
//!
//! Lines can be lost when the provider has been closed, when the log file
//! cannot be opened or written, or when shutdown gives up on a slow drain.
//! Each cause gets its own [`RateLimitedWarner`] so a burst of failures
//! produces periodic summaries instead of one warning per line.

use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;

use crate::rate_limited_warner::{DEFAULT_WARN_INTERVAL, RateLimitedWarner};

/// Categorises why a line was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DropReason {
    Closed,
    OpenFailed,
    WriteFailed,
    Discarded,
}

/// Counts dropped lines and emits rate-limited warnings.
pub(crate) struct DropWarner {
    closed: RateLimitedWarner,
    open_failed: RateLimitedWarner,
    write_failed: RateLimitedWarner,
    discarded: RateLimitedWarner,
    total: AtomicU64,
}

impl DropWarner {
    pub(crate) fn new() -> Self {
        Self {
            closed: RateLimitedWarner::new(DEFAULT_WARN_INTERVAL),
            open_failed: RateLimitedWarner::new(DEFAULT_WARN_INTERVAL),
            write_failed: RateLimitedWarner::new(DEFAULT_WARN_INTERVAL),
            discarded: RateLimitedWarner::new(DEFAULT_WARN_INTERVAL),
            total: AtomicU64::new(0),
        }
    }

    fn warner(&self, reason: DropReason) -> &RateLimitedWarner {
        match reason {
            DropReason::Closed => &self.closed,
            DropReason::OpenFailed => &self.open_failed,
            DropReason::WriteFailed => &self.write_failed,
            DropReason::Discarded => &self.discarded,
        }
    }

    pub(crate) fn record(&self, reason: DropReason) {
        self.total.fetch_add(1, Ordering::Relaxed);
        let warner = self.warner(reason);
        warner.record_drop();
        warner.warn_if_due(|count| emit(reason, count));
    }

    /// Total lines dropped since construction.
    pub(crate) fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn flush(&self) {
        for reason in [
            DropReason::Closed,
            DropReason::OpenFailed,
            DropReason::WriteFailed,
            DropReason::Discarded,
        ] {
            self.warner(reason).flush(|count| emit(reason, count));
        }
    }
}

fn emit(reason: DropReason, count: u64) {
    match reason {
        DropReason::Closed => {
            warn!("FileLoggerProvider: {count} log lines dropped after the provider was closed");
        }
        DropReason::OpenFailed => {
            warn!("FileLoggerProvider: {count} log lines dropped because the log file could not be opened");
        }
        DropReason::WriteFailed => {
            warn!("FileLoggerProvider: {count} log lines dropped because writing the log file failed");
        }
        DropReason::Discarded => {
            warn!("FileLoggerProvider: {count} log lines discarded after the shutdown timeout elapsed");
        }
    }
}
