//! A sink that accumulates formatted lines in memory for test assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::handler::{HandlerError, LineSink};

/// Sink that stores every line it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all lines received so far.
    pub fn collected(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LineSink for CollectingSink {
    fn enqueue(&self, line: String) -> Result<(), HandlerError> {
        self.lines.lock().push(line);
        Ok(())
    }
}
