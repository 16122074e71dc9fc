//! Queue-backed provider that feeds a [`RollingFileWriter`].
//!
//! `FileLoggerProvider` decouples callers from disk I/O. Formatted lines are
//! pushed onto a bounded channel and a single worker thread writes them in
//! FIFO order. A full queue blocks the caller until the worker frees a slot;
//! once the provider is closed new lines are rejected and counted as drops.
//!
//! Shutdown is bounded by [`ProviderConfig::shutdown_timeout`]. Lines still
//! queued when it elapses are discarded rather than holding up the host
//! process.

mod config;
pub(crate) mod drop_warner;
mod worker;

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread::JoinHandle,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

pub use config::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_SHUTDOWN_TIMEOUT, ProviderConfig, ProviderOptions,
};
use drop_warner::{DropReason, DropWarner};
use worker::{WorkerShared, spawn_worker};

use crate::{
    handler::{HandlerError, LineSink},
    handlers::rolling::RollingFileWriter,
};

/// Lifecycle of a [`FileLoggerProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderState {
    /// Accepting lines.
    Running,
    /// Closed to new lines; the worker is emptying the queue.
    Draining,
    /// Worker finished or abandoned and the writer is closed.
    Closed,
}

pub struct FileLoggerProvider {
    tx: Sender<String>,
    shutdown_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
    abandon: Arc<AtomicBool>,
    send_gate: Arc<RwLock<()>>,
    state: Mutex<ProviderState>,
    writer: Arc<RollingFileWriter>,
    drops: Arc<DropWarner>,
    config: ProviderConfig,
}

impl FileLoggerProvider {
    /// Open `writer` and start the worker thread.
    ///
    /// A failed open is reported through `log` and retried by the worker
    /// before each write, so construction itself never fails.
    pub fn new(writer: RollingFileWriter, config: ProviderConfig) -> Self {
        Self::with_options(writer, config, ProviderOptions::default())
    }

    pub fn with_options(
        writer: RollingFileWriter,
        config: ProviderConfig,
        options: ProviderOptions,
    ) -> Self {
        if let Err(err) = writer.open(config.append) {
            warn!("FileLoggerProvider: failed to open log file: {err}");
        }
        let writer = Arc::new(writer);
        let drops = Arc::new(DropWarner::new());
        let abandon = Arc::new(AtomicBool::new(false));
        let send_gate = Arc::new(RwLock::new(()));
        let (tx, rx) = bounded(config.capacity.max(1));
        let (shutdown_tx, shutdown_rx) = bounded(1);
        let shared = WorkerShared {
            writer: Arc::clone(&writer),
            drops: Arc::clone(&drops),
            abandon: Arc::clone(&abandon),
            send_gate: Arc::clone(&send_gate),
        };
        let (done_rx, handle) = spawn_worker(rx, shutdown_rx, shared, options.start_barrier);
        Self {
            tx,
            shutdown_tx,
            done_rx,
            handle: Mutex::new(Some(handle)),
            closed: AtomicBool::new(false),
            abandon,
            send_gate,
            state: Mutex::new(ProviderState::Running),
            writer,
            drops,
            config,
        }
    }

    /// Queue `line`, blocking while the queue is full.
    pub fn enqueue(&self, line: String) -> Result<(), HandlerError> {
        // Shared with other producers; the worker takes it exclusively
        // before its final drain.
        let _gate = self.send_gate.read();
        if self.closed.load(Ordering::Acquire) {
            self.drops.record(DropReason::Closed);
            return Err(HandlerError::Closed);
        }
        self.tx.send(line).map_err(|_| {
            self.drops.record(DropReason::Closed);
            HandlerError::Closed
        })
    }

    /// Stop accepting lines, drain the queue and close the writer.
    ///
    /// Waits at most `shutdown_timeout` for the worker. This method is
    /// idempotent; only the first call performs shutdown work.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        *self.state.lock() = ProviderState::Draining;
        let _ = self.shutdown_tx.try_send(());

        // Drop the lock before joining the worker thread.
        let handle = { self.handle.lock().take() };
        match self.done_rx.recv_timeout(self.config.shutdown_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = handle
                    && handle.join().is_err()
                {
                    warn!("FileLoggerProvider: worker thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                self.abandon.store(true, Ordering::Release);
                warn!(
                    "FileLoggerProvider: worker did not drain within {:?}; discarding remaining lines",
                    self.config.shutdown_timeout
                );
            }
        }

        if let Err(err) = self.writer.close() {
            warn!("FileLoggerProvider: closing log file failed: {err}");
        }
        self.drops.flush();
        *self.state.lock() = ProviderState::Closed;
    }

    pub fn state(&self) -> ProviderState {
        *self.state.lock()
    }

    /// Lines rejected or lost since construction.
    pub fn dropped_lines(&self) -> u64 {
        self.drops.total()
    }

    pub fn config(&self) -> ProviderConfig {
        self.config
    }

    /// The writer fed by this provider.
    pub fn writer(&self) -> &RollingFileWriter {
        &self.writer
    }
}

impl LineSink for FileLoggerProvider {
    fn enqueue(&self, line: String) -> Result<(), HandlerError> {
        FileLoggerProvider::enqueue(self, line)
    }
}

impl Drop for FileLoggerProvider {
    fn drop(&mut self) {
        self.close();
    }
}
