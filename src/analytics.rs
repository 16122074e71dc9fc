//! Fire-and-forget forwarding of log events to an analytics service.
//!
//! [`AnalyticsForwarder`] hands events to a dedicated thread over a bounded
//! channel. When the channel is full the event is dropped; the caller never
//! waits on the sink. Errors and panics raised by the sink are reported
//! through `log::debug!` and otherwise discarded.

use std::{
    collections::BTreeMap,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use log::{debug, warn};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::level::Level;

/// Default number of events buffered for the analytics thread.
pub const DEFAULT_ANALYTICS_CAPACITY: usize = 256;

const ANALYTICS_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Failure reported by an [`AnalyticsSink`].
#[derive(Debug, Error)]
#[error("analytics sink failed: {0}")]
pub struct AnalyticsError(pub String);

/// External analytics service receiving selected log events.
pub trait AnalyticsSink: Send + Sync {
    fn track_event(
        &self,
        name: &str,
        properties: &BTreeMap<String, String>,
    ) -> Result<(), AnalyticsError>;
}

/// Sink that accepts and ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAnalytics;

impl AnalyticsSink for NoopAnalytics {
    fn track_event(
        &self,
        _name: &str,
        _properties: &BTreeMap<String, String>,
    ) -> Result<(), AnalyticsError> {
        Ok(())
    }
}

/// Event name used for `level`, or `None` when the level is not forwarded.
pub fn event_name(level: Level) -> Option<&'static str> {
    match level {
        Level::Information | Level::Warning | Level::Error => Some(level.as_str()),
        _ => None,
    }
}

struct AnalyticsEvent {
    name: &'static str,
    properties: BTreeMap<String, String>,
}

pub struct AnalyticsForwarder {
    tx: RwLock<Option<Sender<AnalyticsEvent>>>,
    done_rx: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    dropped: AtomicU64,
}

impl AnalyticsForwarder {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self::with_capacity(sink, DEFAULT_ANALYTICS_CAPACITY)
    }

    pub fn with_capacity(sink: Arc<dyn AnalyticsSink>, capacity: usize) -> Self {
        let (tx, rx) = bounded::<AnalyticsEvent>(capacity.max(1));
        let (done_tx, done_rx) = bounded(1);
        let handle = thread::spawn(move || {
            for event in rx {
                deliver(sink.as_ref(), &event);
            }
            let _ = done_tx.send(());
        });
        Self {
            tx: RwLock::new(Some(tx)),
            done_rx,
            handle: Mutex::new(Some(handle)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Queue an event for `level` if that level is forwarded.
    pub fn forward(&self, level: Level, properties: BTreeMap<String, String>) {
        let Some(name) = event_name(level) else {
            return;
        };
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match tx.try_send(AnalyticsEvent { name, properties }) {
            Ok(()) => {}
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Events dropped because the queue was full or already shut down.
    pub fn dropped_events(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting events and give the thread a short window to finish.
    pub fn shutdown(&self) {
        self.tx.write().take();
        let handle = { self.handle.lock().take() };
        let Some(handle) = handle else {
            return;
        };
        match self.done_rx.recv_timeout(ANALYTICS_SHUTDOWN_TIMEOUT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    warn!("AnalyticsForwarder: worker thread panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                debug!("AnalyticsForwarder: sink still busy at shutdown; detaching worker");
            }
        }
    }
}

impl Drop for AnalyticsForwarder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn deliver(sink: &dyn AnalyticsSink, event: &AnalyticsEvent) {
    match catch_unwind(AssertUnwindSafe(|| {
        sink.track_event(event.name, &event.properties)
    })) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => debug!("AnalyticsForwarder: {err}"),
        Err(_) => debug!("AnalyticsForwarder: sink panicked while tracking {}", event.name),
    }
}
