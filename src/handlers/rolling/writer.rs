//! Stream ownership and rotation for [`RollingFileWriter`].

use std::{
    fs::{self, File, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use parking_lot::Mutex;

use super::{
    RollingConfig, WriterError,
    clock::{Clock, SystemClock},
    naming::{FileNaming, NameFormatter},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpenMode {
    Append,
    Truncate,
}

#[derive(Default)]
struct RotationState {
    stream: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    bytes_written: u64,
    last_base_name: String,
    rolling_index: usize,
    closed: bool,
}

/// Writes log lines to a dated file and rolls to numbered siblings.
///
/// Every operation runs under one mutex, so the stream, the byte count and
/// the rotation decision are always observed together.
pub struct RollingFileWriter {
    naming: FileNaming,
    config: RollingConfig,
    state: Mutex<RotationState>,
}

impl RollingFileWriter {
    /// Create a writer for `<dir>/<logical_name>-<date>.log`.
    ///
    /// Nothing touches the filesystem until [`open`](Self::open).
    pub fn new(
        dir: impl Into<PathBuf>,
        logical_name: impl Into<String>,
        config: RollingConfig,
    ) -> Self {
        Self {
            naming: FileNaming::new(dir.into(), logical_name.into(), Arc::new(SystemClock)),
            config,
            state: Mutex::new(RotationState {
                rolling_index: 1,
                ..RotationState::default()
            }),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.naming.set_clock(clock);
        self
    }

    /// Rewrite every computed base name through `formatter`.
    pub fn with_name_formatter(mut self, formatter: NameFormatter) -> Self {
        self.naming.set_formatter(formatter);
        self
    }

    /// Open the most recent file for today's base name.
    ///
    /// With `append` the stream is positioned at the end of the existing
    /// file; otherwise the file is truncated. Any stream that is already
    /// open is flushed and replaced.
    pub fn open(&self, append: bool) -> Result<(), WriterError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return Err(WriterError::Closed);
        }
        let dir = self.naming.dir();
        fs::create_dir_all(dir).map_err(|err| WriterError::io(dir, err))?;

        let base = self.naming.base_name();
        let (path, index) = self.resolve_latest(&base)?;
        state.rolling_index = index.map_or(1, |index| self.config.next_index(index));
        state.last_base_name = base;
        let mode = if append {
            OpenMode::Append
        } else {
            OpenMode::Truncate
        };
        switch_stream(state, path, mode)
    }

    /// Append `line` and a newline, rolling first when required.
    pub fn write_line(&self, line: &str, flush: bool) -> Result<(), WriterError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.closed {
            return Err(WriterError::Closed);
        }
        if state.stream.is_none() {
            return Err(WriterError::NotOpen);
        }
        self.rotate_if_needed(state)?;

        let path = state.current_path.clone().unwrap_or_default();
        let stream = state.stream.as_mut().ok_or(WriterError::NotOpen)?;
        writeln!(stream, "{line}").map_err(|err| WriterError::io(&path, err))?;
        state.bytes_written = state.bytes_written.saturating_add(line.len() as u64 + 1);
        if flush {
            stream.flush().map_err(|err| WriterError::io(&path, err))?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<(), WriterError> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match (state.stream.as_mut(), state.current_path.as_deref()) {
            (Some(stream), Some(path)) => stream.flush().map_err(|err| WriterError::io(path, err)),
            _ => Ok(()),
        }
    }

    /// Flush and release the stream. Later writes fail with
    /// [`WriterError::Closed`].
    pub fn close(&self) -> Result<(), WriterError> {
        let mut state = self.state.lock();
        state.closed = true;
        let path = state.current_path.clone().unwrap_or_default();
        match state.stream.take() {
            Some(mut stream) => stream.flush().map_err(|err| WriterError::io(path, err)),
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().stream.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Path of the file currently receiving lines.
    pub fn current_path(&self) -> Option<PathBuf> {
        self.state.lock().current_path.clone()
    }

    /// Base name for the current date, after the name formatter.
    pub fn base_file_name(&self) -> String {
        self.naming.base_name()
    }

    fn resolve_latest(&self, base: &str) -> Result<(PathBuf, Option<usize>), WriterError> {
        if self.config.size_limit().is_none() {
            return Ok((self.naming.base_path(base), None));
        }
        let latest = self
            .naming
            .latest_existing(base)
            .map_err(|err| WriterError::io(self.naming.dir(), err))?;
        Ok(match latest {
            Some(found) => (found.path, found.index),
            None => (self.naming.base_path(base), None),
        })
    }

    fn rotate_if_needed(&self, state: &mut RotationState) -> Result<(), WriterError> {
        let base = self.naming.base_name();
        if base != state.last_base_name {
            let (path, index) = self.resolve_latest(&base)?;
            state.rolling_index = index.map_or(1, |index| self.config.next_index(index));
            state.last_base_name = base;
            return switch_stream(state, path, OpenMode::Append);
        }

        let Some(limit) = self.config.size_limit() else {
            return Ok(());
        };
        if state.bytes_written <= limit {
            return Ok(());
        }
        let (path, mode) = self.next_rolled_path(state, &base);
        switch_stream(state, path, mode)
    }

    /// Pick the next free suffix, or overwrite once the window is full.
    ///
    /// Without a maximum the probe only stops at a free name.
    fn next_rolled_path(&self, state: &mut RotationState, base: &str) -> (PathBuf, OpenMode) {
        let start = state.rolling_index;
        let mut index = start;
        loop {
            let candidate = self.naming.rolled_path(base, index);
            let next = self.config.next_index(index);
            if !candidate.exists() {
                state.rolling_index = next;
                return (candidate, OpenMode::Append);
            }
            if next == start || next == index {
                break;
            }
            index = next;
        }
        state.rolling_index = self.config.next_index(start);
        (self.naming.rolled_path(base, start), OpenMode::Truncate)
    }
}

fn open_file(path: &Path, mode: OpenMode) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        OpenMode::Append => options.append(true),
        OpenMode::Truncate => options.write(true).truncate(true),
    };
    options.open(path)
}

/// Flush and drop the current stream, then open `path`.
///
/// On failure the writer is left without a stream so later writes report
/// [`WriterError::NotOpen`] until it is reopened.
fn switch_stream(
    state: &mut RotationState,
    path: PathBuf,
    mode: OpenMode,
) -> Result<(), WriterError> {
    if let Some(mut old) = state.stream.take() {
        let old_path = state.current_path.clone().unwrap_or_default();
        old.flush().map_err(|err| WriterError::io(old_path, err))?;
    }
    let file = open_file(&path, mode).map_err(|err| WriterError::io(&path, err))?;
    let existing = match mode {
        OpenMode::Append => file
            .metadata()
            .map_err(|err| WriterError::io(&path, err))?
            .len(),
        OpenMode::Truncate => 0,
    };
    state.bytes_written = existing;
    state.stream = Some(BufWriter::new(file));
    state.current_path = Some(path);
    Ok(())
}
