//! Fixtures providing an isolated log directory and a controllable clock.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use beacon_filelog::{LoggerFactory, LoggerFactoryBuilder, LoggingSettings, ManualClock};
use chrono::NaiveDate;
use rstest::fixture;
use tempfile::TempDir;

/// Temporary log directory paired with the clock used for file names.
pub struct LogDir {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl LogDir {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Builder for a factory writing into this directory on this clock.
    pub fn factory(&self, settings: LoggingSettings) -> LoggerFactoryBuilder {
        LoggerFactory::builder(settings, self.path()).with_clock(self.clock.clone())
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Lines of `name`, or an empty list when the file does not exist.
    pub fn lines(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.file(name))
            .unwrap_or_default()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Sorted names of the files in the directory.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("read log dir")
            .filter_map(Result::ok)
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }
}

#[fixture]
pub fn log_dir() -> LogDir {
    LogDir {
        dir: tempfile::tempdir().expect("tempdir"),
        clock: Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
        )),
    }
}
