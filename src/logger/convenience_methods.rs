//! Event-oriented helpers on [`AppLogger`].
//!
//! Each helper builds an [`EventId`] from an [`EventType`], guarantees a
//! non-empty parameter map, writes through [`AppLogger::log`] and forwards
//! the parameters to the analytics sink when one is attached.

use std::collections::BTreeMap;

use crate::{
    event::{DEFAULT_PARAMETER_KEY, ErrorPayload, EventId, EventRecord, EventType},
    level::Level,
};

use super::AppLogger;

fn default_parameters(message: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(DEFAULT_PARAMETER_KEY.to_owned(), message.to_owned())])
}

impl AppLogger {
    /// Log an informational message.
    ///
    /// Each value of `params` is appended to the message on its own line, in
    /// key order.
    pub fn log_info(&self, message: &str, params: Option<&BTreeMap<String, String>>) {
        let text = match params {
            Some(params) if !params.is_empty() => {
                let mut text = message.to_owned();
                for value in params.values() {
                    text.push('\n');
                    text.push_str(value);
                }
                text
            }
            _ => message.to_owned(),
        };
        self.log(Level::Information, EventId::default(), &text, None);
        self.forward(Level::Information, params.cloned().unwrap_or_default());
    }

    /// Log a warning from a message, a structured error, or both.
    ///
    /// Returns without writing when neither is supplied. The forwarded
    /// parameters come from the error when it carries any, otherwise the
    /// message (or the error's message) is stored under `ErrorDesc`.
    pub fn log_warning(
        &self,
        event_type: EventType,
        message: Option<&str>,
        exception: Option<EventRecord>,
    ) {
        let text = match (message, &exception) {
            (None, None) => return,
            (Some(message), _) => message.to_owned(),
            (None, Some(exception)) => exception.message().to_owned(),
        };
        let params = match &exception {
            Some(exception) if !exception.parameters().is_empty() => exception.parameters().clone(),
            _ => default_parameters(&text),
        };
        self.log(
            Level::Warning,
            EventId::from(event_type),
            &text,
            exception.map(ErrorPayload::Structured),
        );
        self.forward(Level::Warning, params);
    }

    /// Log a structured error at [`Level::Error`].
    ///
    /// `message` defaults to the error's own message. Nothing is written or
    /// forwarded when exception logging is disabled.
    pub fn log_exception(
        &self,
        event_type: EventType,
        mut exception: EventRecord,
        message: Option<&str>,
    ) {
        if !self.log_required {
            return;
        }
        let params = exception.ensure_parameters().clone();
        let text = message.unwrap_or(exception.message()).to_owned();
        self.log(
            Level::Error,
            EventId::from(event_type),
            &text,
            Some(ErrorPayload::Structured(exception)),
        );
        self.forward(Level::Error, params);
    }

    /// Log a structured error under the `ERROR` event with its own message.
    pub fn log_error(&self, exception: EventRecord) {
        self.log_exception(EventType::Error, exception, None);
    }
}
