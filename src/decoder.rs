//! Decoding of one or more timer event logs into a [`SummaryMap`]
//!
//! Sources are processed one after another, never interleaved: for each name
//! the resulting sequences are the concatenation of the sources in the order
//! given, then encounter order within each source. Decoding log `A` then log
//! `B` is therefore equivalent to decoding the single file `A ++ B`.
//!
//! Any unreadable source or corrupt stream aborts the whole decode.

use crate::error::{Result, TimerError};
use crate::event::TimerEvent;
use crate::summary::SummaryMap;
use std::fs;
use std::io::BufRead;
use std::path::Path;

/// Fold every event of a stream into `map`
///
/// Returns the number of events decoded.
pub fn decode_reader<R: BufRead>(reader: &mut R, map: &mut SummaryMap) -> Result<usize> {
    let mut count = 0;
    while let Some(event) = TimerEvent::decode(reader)? {
        map.record(&event);
        count += 1;
    }
    Ok(count)
}

/// Decode an in-memory log
pub fn decode_bytes(bytes: &[u8]) -> Result<SummaryMap> {
    let mut map = SummaryMap::new();
    decode_reader(&mut &bytes[..], &mut map)?;
    Ok(map)
}

/// Decode a list of log files, in order, into one map
///
/// Each file is read fully into memory before decoding; the decoded map is
/// never larger than the raw bytes, and the file handle is released before
/// decoding starts.
///
/// # Example
/// ```no_run
/// use timerlog::decoder::decode_files;
/// use timerlog::deltas::reconstruct;
///
/// # fn main() -> anyhow::Result<()> {
/// let summaries = decode_files(&["run-1.tlog", "run-2.tlog"])?;
/// let report = reconstruct(&summaries);
/// for (name, deltas) in &report.deltas {
///     println!("{}: {:?}", name, deltas);
/// }
/// # Ok(())
/// # }
/// ```
pub fn decode_files<P: AsRef<Path>>(paths: &[P]) -> Result<SummaryMap> {
    let mut map = SummaryMap::new();
    for path in paths {
        decode_file_into(path.as_ref(), &mut map)?;
    }
    Ok(map)
}

/// Decode a single log file, appending to an existing map
pub fn decode_file_into(path: &Path, map: &mut SummaryMap) -> Result<usize> {
    let bytes = fs::read(path).map_err(|e| TimerError::io(path, e))?;
    let count = decode_reader(&mut &bytes[..], map)
        .map_err(|e| e.in_context(&path.display().to_string()))?;

    tracing::debug!(
        "Decoded {} timer events ({} bytes) from {}",
        count,
        bytes.len(),
        path.display()
    );
    Ok(count)
}
