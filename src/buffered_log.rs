//! In-memory event log that can be serialized to the binary log format
//!
//! The active buffer is held behind an [`Arc`]. [`BufferedLog::snapshot`],
//! [`BufferedLog::reset`] and [`BufferedLog::replace`] hand out the old buffer
//! as a shared, immutable value; recording into a buffer that someone still
//! holds copies it first, so a snapshot never changes after it is taken.
//!
//! A typical swap-and-drain reporter:
//!
//! ```
//! use timerlog::buffered_log::{write_summaries, BufferedLog};
//! use timerlog::clock::ManualClock;
//! use timerlog::decoder::decode_bytes;
//!
//! # fn main() -> anyhow::Result<()> {
//! let clock = ManualClock::new(0);
//! let mut log = BufferedLog::with_clock(clock.clone());
//! log.start("request")?;
//! clock.advance(250);
//! log.end("request")?;
//!
//! let drained = log.reset();
//! let mut bytes = Vec::new();
//! write_summaries(&drained, &mut bytes)?;
//!
//! assert_eq!(decode_bytes(&bytes)?, *drained);
//! assert!(log.is_empty());
//! # Ok(())
//! # }
//! ```

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::event::{validate_name, write_event, EventKind};
use crate::summary::SummaryMap;
use std::io::Write;
use std::sync::Arc;

/// Buffered log timer
#[derive(Debug)]
pub struct BufferedLog<C: Clock = SystemClock> {
    clock: C,
    buffer: Arc<SummaryMap>,
}

impl BufferedLog<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for BufferedLog<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> BufferedLog<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            buffer: Arc::new(SummaryMap::new()),
        }
    }

    /// Record a start event for `name` at the current time
    pub fn start(&mut self, name: &str) -> Result<()> {
        let now = self.clock.now_nanos();
        self.record_start(name, now)
    }

    /// Record an end event for `name` at the current time
    pub fn end(&mut self, name: &str) -> Result<()> {
        let now = self.clock.now_nanos();
        self.record_end(name, now)
    }

    /// Record a start event with an explicit timestamp
    pub fn record_start(&mut self, name: &str, timestamp: i64) -> Result<()> {
        validate_name(name)?;
        Arc::make_mut(&mut self.buffer).record_start(name, timestamp);
        Ok(())
    }

    /// Record an end event with an explicit timestamp
    pub fn record_end(&mut self, name: &str, timestamp: i64) -> Result<()> {
        validate_name(name)?;
        Arc::make_mut(&mut self.buffer).record_end(name, timestamp);
        Ok(())
    }

    /// Write the active buffer to `writer`
    ///
    /// For each name all starts are written, then all ends. The order of
    /// names is unspecified. Returns the number of events written.
    pub fn serialize<W: Write>(&self, writer: &mut W) -> Result<usize> {
        write_summaries(&self.buffer, writer)
    }

    /// Shared handle to the active buffer
    pub fn snapshot(&self) -> Arc<SummaryMap> {
        Arc::clone(&self.buffer)
    }

    /// Discard the active buffer, returning it
    pub fn reset(&mut self) -> Arc<SummaryMap> {
        self.replace(SummaryMap::new())
    }

    /// Swap in a caller-built buffer, returning the previous one
    pub fn replace(&mut self, buffer: impl Into<Arc<SummaryMap>>) -> Arc<SummaryMap> {
        std::mem::replace(&mut self.buffer, buffer.into())
    }

    /// Number of timer names in the active buffer
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Write any summary map in the binary log format
///
/// Returns the number of events written. Every name is checked before the
/// first byte is written, so an invalid name leaves `writer` untouched.
pub fn write_summaries<W: Write>(map: &SummaryMap, writer: &mut W) -> Result<usize> {
    for name in map.names() {
        validate_name(name)?;
    }

    let mut written = 0;
    for (name, summary) in map {
        for &ts in &summary.starts {
            write_event(writer, name, EventKind::Start, ts)?;
        }
        for &ts in &summary.ends {
            write_event(writer, name, EventKind::End, ts)?;
        }
        written += summary.event_count();
    }
    Ok(written)
}
