//! Registry mapping logger categories to shared [`AppLogger`] instances.
//!
//! [`LoggerFactory`] is an explicit context object owned by the host
//! application. It builds the single [`FileLoggerProvider`] lazily on first
//! use and must be shut down (or dropped) before exit so buffered lines
//! reach disk.

use std::{
    collections::{HashMap, hash_map::Entry},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use delegate::delegate;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::{
    analytics::{AnalyticsForwarder, AnalyticsSink},
    event::EventId,
    formatter::SharedFormatter,
    handler::{ClosedSink, LineSink},
    handlers::{
        file::FileLoggerProvider,
        rolling::{Clock, NameFormatter, RollingFileWriter},
    },
    level::{Level, LevelGate},
    logger::AppLogger,
    settings::LoggingSettings,
};

/// Category used for the factory's own messages.
pub const FACTORY_CATEGORY: &str = "LoggerFactory";

pub struct LoggerFactoryBuilder {
    settings: LoggingSettings,
    dir: PathBuf,
    clock: Option<Arc<dyn Clock>>,
    name_formatter: Option<NameFormatter>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    gate: Option<Arc<LevelGate>>,
    formatter: SharedFormatter,
}

impl LoggerFactoryBuilder {
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_name_formatter(mut self, formatter: NameFormatter) -> Self {
        self.name_formatter = Some(formatter);
        self
    }

    pub fn with_analytics(mut self, sink: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(sink);
        self
    }

    /// Share an existing gate instead of creating one from the settings.
    pub fn with_level_gate(mut self, gate: Arc<LevelGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn with_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn build(self) -> LoggerFactory {
        let gate = self
            .gate
            .unwrap_or_else(|| Arc::new(LevelGate::new(self.settings.minimum_level)));
        LoggerFactory {
            analytics: self
                .analytics
                .map(|sink| Arc::new(AnalyticsForwarder::new(sink))),
            settings: self.settings,
            dir: self.dir,
            clock: self.clock,
            name_formatter: self.name_formatter,
            gate,
            formatter: self.formatter,
            provider: OnceCell::new(),
            loggers: RwLock::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
        }
    }
}

pub struct LoggerFactory {
    settings: LoggingSettings,
    dir: PathBuf,
    clock: Option<Arc<dyn Clock>>,
    name_formatter: Option<NameFormatter>,
    gate: Arc<LevelGate>,
    formatter: SharedFormatter,
    analytics: Option<Arc<AnalyticsForwarder>>,
    provider: OnceCell<Arc<FileLoggerProvider>>,
    loggers: RwLock<HashMap<String, Arc<AppLogger>>>,
    shut_down: AtomicBool,
}

impl LoggerFactory {
    /// Start configuring a factory that writes logs under `dir`.
    pub fn builder(settings: LoggingSettings, dir: impl Into<PathBuf>) -> LoggerFactoryBuilder {
        LoggerFactoryBuilder {
            settings,
            dir: dir.into(),
            clock: None,
            name_formatter: None,
            analytics: None,
            gate: None,
            formatter: SharedFormatter::default(),
        }
    }

    /// Return the logger for `category`, creating it on first request.
    ///
    /// After [`shutdown`](Self::shutdown) the returned logger is not cached
    /// and every line it produces is rejected.
    pub fn get_logger(&self, category: &str) -> Arc<AppLogger> {
        if let Some(logger) = self.loggers.read().get(category) {
            return Arc::clone(logger);
        }
        let Some(provider) = self.provider() else {
            return Arc::new(self.new_logger(category, Arc::new(ClosedSink)));
        };
        if self.shut_down.load(Ordering::Acquire) {
            return Arc::new(self.new_logger(category, provider));
        }
        let mut loggers = self.loggers.write();
        match loggers.entry(category.to_owned()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                Arc::clone(entry.insert(Arc::new(self.new_logger(category, provider))))
            }
        }
    }

    /// The file provider shared by every logger, built on first use.
    ///
    /// Returns `None` once the factory has shut down without ever building
    /// one; shutdown never creates a log file.
    pub fn provider(&self) -> Option<Arc<FileLoggerProvider>> {
        if self.shut_down.load(Ordering::Acquire) {
            return self.provider.get().cloned();
        }
        let mut created = false;
        let provider = Arc::clone(self.provider.get_or_init(|| {
            created = true;
            Arc::new(self.build_provider())
        }));
        if self.shut_down.load(Ordering::Acquire) {
            // Lost a race with shutdown, which may not have seen this provider.
            provider.close();
        } else if created {
            self.get_logger(FACTORY_CATEGORY).log(
                Level::Information,
                EventId::default(),
                "Initializing logger...",
                None,
            );
        }
        Some(provider)
    }

    pub fn level_gate(&self) -> Arc<LevelGate> {
        Arc::clone(&self.gate)
    }

    pub fn settings(&self) -> &LoggingSettings {
        &self.settings
    }

    delegate! {
        to self.gate {
            /// Change the minimum level for every logger of this factory.
            pub fn set_level(&self, level: Level);
            pub fn current_level(&self) -> Level;
        }
    }

    /// Drain and close the provider, stop analytics and forget cached loggers.
    ///
    /// Safe to call more than once.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(provider) = self.provider.get() {
            provider.close();
        }
        if let Some(analytics) = &self.analytics {
            analytics.shutdown();
        }
        self.loggers.write().clear();
    }

    fn new_logger(&self, category: &str, sink: Arc<dyn LineSink>) -> AppLogger {
        let logger = AppLogger::new(category, sink, Arc::clone(&self.gate))
            .with_formatter(self.formatter.clone())
            .with_file_log_enabled(self.settings.enable_file_log)
            .with_log_required(self.settings.is_log_required);
        match &self.analytics {
            Some(analytics) => logger.with_analytics(Arc::clone(analytics)),
            None => logger,
        }
    }

    fn build_provider(&self) -> FileLoggerProvider {
        let mut writer = RollingFileWriter::new(
            self.dir.clone(),
            self.settings.log_file_name.clone(),
            self.settings.rolling_config(),
        );
        if let Some(clock) = &self.clock {
            writer = writer.with_clock(Arc::clone(clock));
        }
        if let Some(formatter) = &self.name_formatter {
            writer = writer.with_name_formatter(Arc::clone(formatter));
        }
        FileLoggerProvider::new(writer, self.settings.provider_config())
    }
}

impl Drop for LoggerFactory {
    fn drop(&mut self) {
        self.shutdown();
    }
}
