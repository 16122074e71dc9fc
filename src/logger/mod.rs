//! Call-site logging API.
//!
//! [`AppLogger`] filters records against the shared [`LevelGate`], formats
//! accepted records into one line and hands the line to a [`LineSink`]. It
//! never touches the filesystem itself, so the only way a logging call can
//! stall is queue backpressure in the sink.
//!
//! The event-oriented helpers (`log_info`, `log_warning`, `log_exception`,
//! `log_error`) live in `convenience_methods`.

mod convenience_methods;

use std::{collections::BTreeMap, sync::Arc};

use crate::{
    analytics::AnalyticsForwarder,
    event::{ErrorPayload, EventId},
    formatter::SharedFormatter,
    handler::LineSink,
    level::{Level, LevelGate},
    log_record::LogRecord,
};

pub struct AppLogger {
    /// Category name written in brackets on every line.
    name: String,
    gate: Arc<LevelGate>,
    sink: Arc<dyn LineSink>,
    formatter: SharedFormatter,
    analytics: Option<Arc<AnalyticsForwarder>>,
    file_log_enabled: bool,
    log_required: bool,
}

impl AppLogger {
    /// Create a logger writing through `sink`, filtered by `gate`.
    ///
    /// File logging and exception logging start enabled.
    pub fn new(name: impl Into<String>, sink: Arc<dyn LineSink>, gate: Arc<LevelGate>) -> Self {
        Self {
            name: name.into(),
            gate,
            sink,
            formatter: SharedFormatter::default(),
            analytics: None,
            file_log_enabled: true,
            log_required: true,
        }
    }

    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<AnalyticsForwarder>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// When disabled, every call is a no-op for the file sink.
    pub fn with_file_log_enabled(mut self, enabled: bool) -> Self {
        self.file_log_enabled = enabled;
        self
    }

    /// When disabled, `log_exception` and `log_error` do nothing.
    pub fn with_log_required(mut self, required: bool) -> Self {
        self.log_required = required;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return whether a record at `level` would reach the sink.
    pub fn is_enabled(&self, level: Level) -> bool {
        self.file_log_enabled && self.gate.is_enabled(level)
    }

    /// Format a record and queue it for writing.
    ///
    /// Does nothing when `level` is below the gate or file logging is
    /// disabled. A rejected line is already counted by the sink, so the
    /// error is not reported again here.
    pub fn log(
        &self,
        level: Level,
        event_id: EventId,
        message: &str,
        exception: Option<ErrorPayload>,
    ) {
        if !self.is_enabled(level) {
            return;
        }
        let record = LogRecord::new(&self.name, level, event_id, message).with_exception(exception);
        let line = self.formatter.format(&record);
        if line.is_empty() {
            return;
        }
        let _ = self.sink.enqueue(line);
    }

    fn forward(&self, level: Level, properties: BTreeMap<String, String>) {
        if let Some(analytics) = &self.analytics {
            analytics.forward(level, properties);
        }
    }
}
