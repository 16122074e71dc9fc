//! Background consumer for [`FileLoggerProvider`](super::FileLoggerProvider).
//!
//! The worker is the only thread that writes through the
//! [`RollingFileWriter`]. It takes lines in FIFO order, flushes when it
//! observes the queue empty after a take, and on shutdown drains whatever is
//! left unless the provider has already given up waiting.

use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, bounded, select};
use log::{debug, warn};
use parking_lot::RwLock;

use super::drop_warner::{DropReason, DropWarner};
use crate::handlers::rolling::{RollingFileWriter, WriterError};

/// State shared between the provider handle and its worker thread.
pub(super) struct WorkerShared {
    pub(super) writer: Arc<RollingFileWriter>,
    pub(super) drops: Arc<DropWarner>,
    /// Set by `close` when the drain timeout elapses.
    pub(super) abandon: Arc<AtomicBool>,
    /// Producers hold this shared across their closed check and send.
    pub(super) send_gate: Arc<RwLock<()>>,
}

pub(super) fn spawn_worker(
    rx: Receiver<String>,
    shutdown_rx: Receiver<()>,
    shared: WorkerShared,
    start_barrier: Option<Arc<Barrier>>,
) -> (Receiver<()>, JoinHandle<()>) {
    let (done_tx, done_rx) = bounded(1);
    let handle = thread::spawn(move || {
        if let Some(barrier) = start_barrier {
            barrier.wait();
        }
        worker_loop(&rx, &shutdown_rx, &shared);
        let _ = done_tx.send(());
    });
    (done_rx, handle)
}

fn worker_loop(rx: &Receiver<String>, shutdown_rx: &Receiver<()>, shared: &WorkerShared) {
    loop {
        // A saturated queue must not starve the shutdown signal.
        if shutdown_rx.try_recv().is_ok() {
            finish(rx, shared);
            return;
        }
        select! {
            recv(shutdown_rx) -> _ => {
                finish(rx, shared);
                return;
            },
            recv(rx) -> line => match line {
                Ok(line) => write_line(shared, &line, rx.is_empty()),
                Err(_) => {
                    flush(shared);
                    return;
                }
            },
        }
    }
}

/// Drain until no producer is mid-send, then take what they left behind.
///
/// Holding the gate exclusively means every later `enqueue` observes the
/// provider closed, so no accepted line can outlive the receiver uncounted.
fn finish(rx: &Receiver<String>, shared: &WorkerShared) {
    loop {
        drain(rx, shared);
        if let Some(_exclusive) = shared.send_gate.try_write() {
            drain(rx, shared);
            return;
        }
        // A producer blocked on a full queue needs the drain to make room.
        thread::yield_now();
    }
}

fn drain(rx: &Receiver<String>, shared: &WorkerShared) {
    while let Ok(line) = rx.try_recv() {
        if shared.abandon.load(Ordering::Acquire) {
            shared.drops.record(DropReason::Discarded);
            continue;
        }
        write_line(shared, &line, rx.is_empty());
    }
    flush(shared);
}

/// Write one line, reopening the file first if an earlier open failed.
fn write_line(shared: &WorkerShared, line: &str, flush: bool) {
    let writer = &shared.writer;
    if !writer.is_open()
        && !writer.is_closed()
        && let Err(err) = writer.open(true)
    {
        debug!("FileLoggerProvider: reopening log file failed: {err}");
        shared.drops.record(DropReason::OpenFailed);
        return;
    }
    match writer.write_line(line, flush) {
        Ok(()) => {}
        Err(WriterError::Closed) => shared.drops.record(DropReason::Closed),
        Err(WriterError::NotOpen) => shared.drops.record(DropReason::OpenFailed),
        Err(err) => {
            debug!("FileLoggerProvider: write failed: {err}");
            shared.drops.record(DropReason::WriteFailed);
        }
    }
}

fn flush(shared: &WorkerShared) {
    if let Err(err) = shared.writer.flush() {
        warn!("FileLoggerProvider: flush failed: {err}");
    }
}
