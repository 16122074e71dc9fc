//! Configuration for [`FileLoggerProvider`](super::FileLoggerProvider).
//!
//! Values are fixed once the provider is constructed; there is no live
//! reconfiguration.

use std::{
    sync::{Arc, Barrier},
    time::Duration,
};

/// Default bounded queue capacity for `FileLoggerProvider`.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default time `close` waits for the worker to drain the queue.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(1500);

/// Queue and lifecycle settings for a [`FileLoggerProvider`](super::FileLoggerProvider).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bounded queue size for lines waiting to be written.
    pub capacity: usize,
    /// Append to the latest existing file instead of truncating it.
    pub append: bool,
    /// Upper bound on how long shutdown waits for the queue to drain.
    pub shutdown_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            append: true,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

/// Construction hooks used by tests.
#[derive(Clone, Default)]
pub struct ProviderOptions {
    /// The worker waits on this barrier before consuming any line.
    pub start_barrier: Option<Arc<Barrier>>,
}

impl ProviderOptions {
    pub fn with_start_barrier(barrier: Arc<Barrier>) -> Self {
        Self {
            start_barrier: Some(barrier),
        }
    }
}
