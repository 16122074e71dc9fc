//! Structured error values carried into the log.
//!
//! [`EventRecord`] is the structured application error: a message, an
//! optional classification name, and a string-to-string parameter map used
//! for context such as a beacon address or an HTTP status. [`ErrorPayload`]
//! is the tagged union the logger formats; only its `Structured` variant has
//! its parameter map serialised into the line.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Key under which a message is stored when no parameters are supplied.
pub const DEFAULT_PARAMETER_KEY: &str = "ErrorDesc";

/// Boxed error accepted as the inner cause of an [`EventRecord`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Classification attached to logged events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EventType {
    Error = 1,
    Warning = 2,
}

impl EventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventType::Error => "ERROR",
            EventType::Warning => "WARNING",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric event identifier with an optional name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    pub fn new(id: i32, name: Option<String>) -> Self {
        Self { id, name }
    }
}

impl From<EventType> for EventId {
    fn from(event_type: EventType) -> Self {
        Self::new(event_type as i32, Some(event_type.as_str().to_owned()))
    }
}

impl fmt::Display for EventId {
    /// Renders the name when present, otherwise the numeric id.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Structured application error with a parameter map for context.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct EventRecord {
    message: String,
    event_name: Option<String>,
    parameters: BTreeMap<String, String>,
    #[source]
    source: Option<BoxError>,
}

impl EventRecord {
    /// Create a record whose parameters hold `message` under
    /// [`DEFAULT_PARAMETER_KEY`].
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let parameters = BTreeMap::from([(DEFAULT_PARAMETER_KEY.to_owned(), message.clone())]);
        Self {
            message,
            event_name: None,
            parameters,
            source: None,
        }
    }

    /// Wrap an arbitrary error, reusing its message.
    pub fn from_error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::new(err.to_string()).with_source(err)
    }

    pub fn with_event_name(mut self, name: impl Into<String>) -> Self {
        self.event_name = Some(name.into());
        self
    }

    /// Replace the parameter map.
    pub fn with_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event_name.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Insert the message under the default key when the map is empty.
    pub fn ensure_parameters(&mut self) -> &BTreeMap<String, String> {
        if self.parameters.is_empty() {
            self.parameters
                .insert(DEFAULT_PARAMETER_KEY.to_owned(), self.message.clone());
        }
        &self.parameters
    }
}

/// Error attached to a log call.
#[derive(Debug, Error)]
pub enum ErrorPayload {
    /// Structured error whose parameters are serialised into the line.
    #[error(transparent)]
    Structured(#[from] EventRecord),
    /// Any other error; only its description is written.
    #[error(transparent)]
    Plain(#[from] BoxError),
}

impl ErrorPayload {
    pub fn plain<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Plain(Box::new(err))
    }

    /// Parameters carried by a structured payload.
    pub fn parameters(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ErrorPayload::Structured(record) => Some(record.parameters()),
            ErrorPayload::Plain(_) => None,
        }
    }
}
