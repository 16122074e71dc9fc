//! Severity levels and the shared minimum-level gate.
//!
//! [`Level`] is a closed, ordered set of severities compared numerically.
//! [`LevelGate`] stores the current threshold in an `AtomicU8` so the UI
//! thread can change it while call-site threads and the background consumer
//! read it without locking.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    #[default]
    Information = 2,
    Warning = 3,
    Error = 4,
    Critical = 5,
    /// Threshold that disables every record.
    None = 6,
}

impl Level {
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "Trace",
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Critical => "Critical",
            Level::None => "None",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level as u8
    }
}

impl From<u8> for Level {
    /// Values above the known range saturate to [`Level::None`].
    fn from(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Information,
            3 => Level::Warning,
            4 => Level::Error,
            5 => Level::Critical,
            _ => Level::None,
        }
    }
}

/// Returned when a level string matches no known severity.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level '{0}'")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TRACE" => Ok(Self::Trace),
            "DEBUG" => Ok(Self::Debug),
            "INFORMATION" | "INFO" => Ok(Self::Information),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            "NONE" => Ok(Self::None),
            _ => Err(ParseLevelError(s.to_owned())),
        }
    }
}

/// Shared, mutable minimum-severity threshold.
///
/// Last writer wins; no ordering with other memory operations is needed
/// because the threshold is a coarse, rarely changed knob.
#[derive(Debug)]
pub struct LevelGate {
    level: AtomicU8,
}

impl LevelGate {
    pub fn new(level: Level) -> Self {
        Self {
            level: AtomicU8::new(u8::from(level)),
        }
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(u8::from(level), Ordering::Relaxed);
    }

    pub fn current_level(&self) -> Level {
        Level::from(self.level.load(Ordering::Relaxed))
    }

    /// Return whether a record at `level` passes the gate.
    ///
    /// `Level::None` is a threshold only; records carrying it never pass.
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::None && level >= self.current_level()
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(Level::default())
    }
}
