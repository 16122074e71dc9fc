//! Log file naming and discovery.
//!
//! The base name is `<logical>-<yyyy-MM-dd>` (UTC), optionally passed
//! through a caller-supplied [`NameFormatter`]. The active file is
//! `<base>.log`; rolled files are `<base> <n>.log` with `n >= 1`.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::SystemTime,
};

use super::clock::Clock;

pub const LOG_EXTENSION: &str = "log";

/// Hook that rewrites the computed base name before use.
pub type NameFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// An existing log file belonging to the current base name.
#[derive(Debug)]
pub(crate) struct ExistingLog {
    pub(crate) path: PathBuf,
    /// Rolling suffix, `None` for the unsuffixed base file.
    pub(crate) index: Option<usize>,
}

pub(crate) struct FileNaming {
    dir: PathBuf,
    logical_name: String,
    clock: Arc<dyn Clock>,
    formatter: Option<NameFormatter>,
}

impl FileNaming {
    pub(crate) fn new(dir: PathBuf, logical_name: String, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir,
            logical_name,
            clock,
            formatter: None,
        }
    }

    pub(crate) fn set_clock(&mut self, clock: Arc<dyn Clock>) {
        self.clock = clock;
    }

    pub(crate) fn set_formatter(&mut self, formatter: NameFormatter) {
        self.formatter = Some(formatter);
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn base_name(&self) -> String {
        let name = format!(
            "{}-{}",
            self.logical_name,
            self.clock.today_utc().format("%Y-%m-%d")
        );
        match &self.formatter {
            Some(format) => format(&name),
            None => name,
        }
    }

    pub(crate) fn base_path(&self, base: &str) -> PathBuf {
        self.dir.join(format!("{base}.{LOG_EXTENSION}"))
    }

    pub(crate) fn rolled_path(&self, base: &str, index: usize) -> PathBuf {
        self.dir.join(format!("{base} {index}.{LOG_EXTENSION}"))
    }

    /// Find the most recently modified log file for `base`.
    ///
    /// Candidates are ranked by modification time, newest first; equal times
    /// fall back to the file name in descending order. A missing directory
    /// yields `None`.
    pub(crate) fn latest_existing(&self, base: &str) -> io::Result<Option<ExistingLog>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut candidates: Vec<(SystemTime, String, ExistingLog)> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                if !metadata.is_file() {
                    return None;
                }
                let file_name = entry.file_name().into_string().ok()?;
                let index = parse_index(base, &file_name)?;
                let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some((
                    modified,
                    file_name,
                    ExistingLog {
                        path: entry.path(),
                        index,
                    },
                ))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(candidates.into_iter().next().map(|(_, _, log)| log))
    }
}

/// Classify `file_name` against `base`.
///
/// Returns `Some(None)` for the base file, `Some(Some(n))` for a rolled file
/// and `None` for anything else.
pub(crate) fn parse_index(base: &str, file_name: &str) -> Option<Option<usize>> {
    let stem = file_name.strip_suffix(&format!(".{LOG_EXTENSION}"))?;
    if stem == base {
        return Some(None);
    }
    let suffix = stem.strip_prefix(base)?.strip_prefix(' ')?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match suffix.parse::<usize>() {
        Ok(index) if index > 0 => Some(Some(index)),
        _ => None,
    }
}
