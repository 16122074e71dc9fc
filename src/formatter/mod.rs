//! Formatting of log records into single file lines.
//!
//! Provides the [`LineFormatter`] trait, the [`SharedFormatter`] trait-object
//! wrapper loggers hold, and the [`DefaultFormatter`] that produces the
//! tab-separated layout written to disk:
//!
//! ```text
//! <ISO-8601 local time>\t<Level>\t[<category>]\t[<event>]\t<message>
//! <error description>
//! <JSON parameter map>
//! ```
//!
//! The header is omitted for an empty message; the error lines are only
//! present when the record carries an error, and the JSON line only for a
//! structured error with a non-empty parameter map.

use std::{fmt, sync::Arc};

use chrono::{DateTime, Local, SecondsFormat};
use log::warn;

use crate::event::ErrorPayload;
use crate::log_record::LogRecord;

mod exception;

pub use exception::format_error_description;

/// Trait for formatting log records into strings.
///
/// Implementors must be `Send + Sync` so one formatter can serve every
/// logger in the process.
pub trait LineFormatter: Send + Sync {
    fn format(&self, record: &LogRecord) -> String;
}

/// Shared formatter trait object used by loggers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn LineFormatter>,
}

impl SharedFormatter {
    pub fn new<F>(formatter: F) -> Self
    where
        F: LineFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    pub fn format(&self, record: &LogRecord) -> String {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn LineFormatter>)")
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl DefaultFormatter {
    fn format_header(record: &LogRecord) -> String {
        let timestamp: DateTime<Local> = record.timestamp.into();
        format!(
            "{}\t{}\t[{}]\t[{}]\t{}",
            timestamp.to_rfc3339_opts(SecondsFormat::Micros, false),
            record.level,
            record.logger,
            record.event_id,
            record.message
        )
    }
}

impl LineFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> String {
        let mut output = String::new();
        if !record.message.is_empty() {
            output.push_str(&Self::format_header(record));
        }

        let Some(exception) = &record.exception else {
            return output;
        };
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format_error_description(exception));

        if let ErrorPayload::Structured(event) = exception
            && !event.parameters().is_empty()
        {
            match serde_json::to_string(event.parameters()) {
                Ok(json) => {
                    output.push('\n');
                    output.push_str(&json);
                }
                Err(err) => warn!("DefaultFormatter: failed to serialise parameters: {err}"),
            }
        }
        output
    }
}
