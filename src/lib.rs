//! Asynchronous rolling file logger for the beacon scanner.
//!
//! Call sites log through an [`AppLogger`] obtained from a [`LoggerFactory`].
//! Each accepted record is formatted into one line and queued on the
//! [`FileLoggerProvider`], whose single worker thread writes lines in order
//! through a [`RollingFileWriter`] that rolls by size and by UTC date.

pub mod analytics;
pub mod event;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod log_record;
pub mod logger;
pub mod manager;
pub mod rate_limited_warner;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_utils;

pub use analytics::{AnalyticsError, AnalyticsForwarder, AnalyticsSink, NoopAnalytics};
pub use event::{BoxError, DEFAULT_PARAMETER_KEY, ErrorPayload, EventId, EventRecord, EventType};
pub use formatter::{DefaultFormatter, LineFormatter, SharedFormatter};
pub use handler::{ClosedSink, HandlerError, LineSink};
pub use handlers::{
    file::{FileLoggerProvider, ProviderConfig, ProviderOptions, ProviderState},
    rolling::{
        Clock, ManualClock, NameFormatter, RollingConfig, RollingFileWriter, SystemClock,
        WriterError,
    },
};
pub use level::{Level, LevelGate, ParseLevelError};
pub use log_record::LogRecord;
pub use logger::AppLogger;
pub use manager::{LoggerFactory, LoggerFactoryBuilder};
pub use settings::{ConfigError, LoggingSettings};
