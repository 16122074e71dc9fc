use thiserror::Error;

/// Reasons a sink refuses a formatted line.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// The sink has stopped accepting entries.
    #[error("sink closed")]
    Closed,
}

/// Destination for formatted log lines.
///
/// `LineSink` is `Send + Sync` so one sink can serve loggers on every
/// thread. Implementations hand the line to their own consumer and never
/// perform disk I/O on the caller's thread.
pub trait LineSink: Send + Sync {
    /// Queue `line` for writing.
    fn enqueue(&self, line: String) -> Result<(), HandlerError>;
}

/// Sink that rejects every line.
///
/// Stands in for a provider that was never built before shutdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosedSink;

impl LineSink for ClosedSink {
    fn enqueue(&self, _line: String) -> Result<(), HandlerError> {
        Err(HandlerError::Closed)
    }
}
