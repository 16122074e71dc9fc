//! Rolling log file writer.
//!
//! [`RollingFileWriter`] is the only component that touches the filesystem
//! for log output. It owns one open stream, decides before every write
//! whether to roll to another file, and names files
//! `<base>-<yyyy-MM-dd>[ <n>].log` using a UTC date supplied by a [`Clock`].

mod clock;
mod naming;
mod writer;

use std::{io, num::NonZeroUsize, path::PathBuf};

use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use naming::{LOG_EXTENSION, NameFormatter};
pub use writer::RollingFileWriter;

/// Size and rolling-window limits for a [`RollingFileWriter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollingConfig {
    /// Byte length past which the next write rolls to a new file.
    ///
    /// Zero or negative disables size-based rolling.
    pub file_size_limit_bytes: i64,
    /// Highest numeric suffix before the index wraps back to 1.
    ///
    /// `None` lets suffixes grow without bound, so no file is overwritten.
    pub max_rolling_files: Option<NonZeroUsize>,
}

impl RollingConfig {
    /// A `max_rolling_files` of zero means there is no maximum.
    pub const fn new(file_size_limit_bytes: i64, max_rolling_files: usize) -> Self {
        Self {
            file_size_limit_bytes,
            max_rolling_files: NonZeroUsize::new(max_rolling_files),
        }
    }

    /// Return the size limit as an unsigned byte count when rolling is enabled.
    ///
    /// Stream lengths are `u64`; the signed limit is converted once here so
    /// the comparison never mixes signedness.
    pub fn size_limit(&self) -> Option<u64> {
        u64::try_from(self.file_size_limit_bytes)
            .ok()
            .filter(|limit| *limit > 0)
    }

    /// Advance a suffix, wrapping to 1 past the maximum when there is one.
    pub(crate) fn next_index(&self, index: usize) -> usize {
        let next = index.saturating_add(1);
        match self.max_rolling_files {
            Some(max) if next > max.get() => 1,
            _ => next,
        }
    }
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self::new(2_097_152, 1)
    }
}

/// Failures surfaced by [`RollingFileWriter`].
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("log file is not open")]
    NotOpen,
    #[error("log writer has been closed")]
    Closed,
}

impl WriterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests;
