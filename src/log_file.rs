//! Log timer that streams each event straight to a file
//!
//! Unlike [`crate::buffered_log::BufferedLog`], every `start`/`end` call
//! reaches the file (through a `BufWriter`) as soon as it is made, so the log
//! survives a crash up to the last flushed event.

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, TimerError};
use crate::event::{write_event, EventKind};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Direct-to-file log timer
#[derive(Debug)]
pub struct LogFileWriter<C: Clock = SystemClock> {
    path: PathBuf,
    writer: BufWriter<File>,
    clock: C,
    events_written: u64,
}

impl LogFileWriter<SystemClock> {
    /// Create (or truncate) a log file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::create_with_clock(path, SystemClock)
    }

    /// Open a log file for appending, creating it if needed
    pub fn append<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::append_with_clock(path, SystemClock)
    }
}

impl<C: Clock> LogFileWriter<C> {
    pub fn create_with_clock<P: AsRef<Path>>(path: P, clock: C) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TimerError::io(path, e))?;
        Ok(Self::from_file(path, file, clock))
    }

    pub fn append_with_clock<P: AsRef<Path>>(path: P, clock: C) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| TimerError::io(path, e))?;
        Ok(Self::from_file(path, file, clock))
    }

    fn from_file(path: &Path, file: File, clock: C) -> Self {
        tracing::debug!("Opened timer log {}", path.display());
        Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            clock,
            events_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn events_written(&self) -> u64 {
        self.events_written
    }

    /// Log a start event for `name` at the current time
    pub fn start(&mut self, name: &str) -> Result<()> {
        self.log_event(name, EventKind::Start)
    }

    /// Log an end event for `name` at the current time
    pub fn end(&mut self, name: &str) -> Result<()> {
        self.log_event(name, EventKind::End)
    }

    fn log_event(&mut self, name: &str, kind: EventKind) -> Result<()> {
        let timestamp = self.clock.now_nanos();
        write_event(&mut self.writer, name, kind, timestamp).map_err(|e| match e {
            TimerError::Io { source, .. } => TimerError::io(&self.path, source),
            other => other,
        })?;
        self.events_written += 1;
        Ok(())
    }

    /// Flush buffered events to disk without closing
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| TimerError::io(&self.path, e))
    }

    /// Flush, sync and close the log file
    ///
    /// The file handle is released when `self` drops at the end of this call.
    pub fn close(mut self) -> Result<()> {
        self.flush()?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| TimerError::io(&self.path, e))?;
        tracing::debug!(
            "Closed timer log {} after {} events",
            self.path.display(),
            self.events_written
        );
        Ok(())
    }
}

impl<C: Clock> Drop for LogFileWriter<C> {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::warn!("Failed to flush timer log {}: {}", self.path.display(), e);
        }
    }
}
