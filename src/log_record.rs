//! Log record representation.
//!
//! A [`LogRecord`] is built per logging call, formatted into a single line,
//! and then discarded. It is never shared after formatting.

use std::fmt;
use std::time::SystemTime;

use crate::event::{ErrorPayload, EventId};
use crate::level::Level;

#[derive(Debug)]
pub struct LogRecord {
    /// Category name of the logger that created this record.
    pub logger: String,
    pub level: Level,
    pub event_id: EventId,
    pub message: String,
    pub exception: Option<ErrorPayload>,
    /// Time the record was created.
    pub timestamp: SystemTime,
}

impl LogRecord {
    /// Construct a record stamped with the current time.
    pub fn new(logger: &str, level: Level, event_id: EventId, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            event_id,
            message: message.to_owned(),
            exception: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_exception(mut self, exception: Option<ErrorPayload>) -> Self {
        self.exception = exception;
        self
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
