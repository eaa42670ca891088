//! Binary wire format for timer events
//!
//! Each event is laid out as:
//!
//! ```text
//! ┌──────────────────┬──────┬──────────┬──────────────────────────────┐
//! │ name (UTF-8)     │ 0x00 │ kind tag │ timestamp (i64, little end.) │
//! │ variable length  │ 1 B  │ 1 B      │ 8 B                          │
//! └──────────────────┴──────┴──────────┴──────────────────────────────┘
//! ```
//!
//! There is no header and no delimiter between events, so log files can be
//! concatenated byte-for-byte. A stream is valid if it holds zero or more
//! complete events and nothing else.

use crate::error::{Result, TimerError};
use std::io::{self, BufRead, Read, Write};

/// Name terminator
pub const NAME_TERMINATOR: u8 = 0x00;

/// Kind tag written for a start event
pub const START_TAG: u8 = b's';

/// Kind tag written for an end event
pub const END_TAG: u8 = b'e';

const TIMESTAMP_LEN: usize = 8;

/// Whether an event marks the start or the end of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    End,
}

impl EventKind {
    pub fn tag(self) -> u8 {
        match self {
            EventKind::Start => START_TAG,
            EventKind::End => END_TAG,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            START_TAG => Some(EventKind::Start),
            END_TAG => Some(EventKind::End),
            _ => None,
        }
    }
}

/// A single recorded start or end of a named timer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEvent {
    pub name: String,
    pub kind: EventKind,
    /// Nanoseconds from the producer's clock
    pub timestamp: i64,
}

/// Reject names that would be ambiguous with the terminator byte
pub fn validate_name(name: &str) -> Result<()> {
    if name.as_bytes().contains(&NAME_TERMINATOR) {
        return Err(TimerError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Write one event without building a `TimerEvent`
///
/// The name is validated before anything reaches the writer, so a rejected
/// event never leaves a partial record behind.
pub fn write_event<W: Write>(
    writer: &mut W,
    name: &str,
    kind: EventKind,
    timestamp: i64,
) -> Result<()> {
    validate_name(name)?;

    let mut record = Vec::with_capacity(name.len() + 2 + TIMESTAMP_LEN);
    record.extend_from_slice(name.as_bytes());
    record.push(NAME_TERMINATOR);
    record.push(kind.tag());
    record.extend_from_slice(&timestamp.to_le_bytes());

    writer
        .write_all(&record)
        .map_err(|e| TimerError::io("<log sink>", e))
}

impl TimerEvent {
    pub fn new(name: impl Into<String>, kind: EventKind, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            kind,
            timestamp,
        }
    }

    pub fn start(name: impl Into<String>, timestamp: i64) -> Self {
        Self::new(name, EventKind::Start, timestamp)
    }

    pub fn end(name: impl Into<String>, timestamp: i64) -> Self {
        Self::new(name, EventKind::End, timestamp)
    }

    /// Number of bytes this event occupies on the wire
    pub fn encoded_len(&self) -> usize {
        self.name.len() + 2 + TIMESTAMP_LEN
    }

    /// Encode this event to a writer
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidName`] if the name contains a NUL byte.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_event(writer, &self.name, self.kind, self.timestamp)
    }

    /// Encode this event into a fresh byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out)?;
        Ok(out)
    }

    /// Decode the next event from a reader
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between events. Running
    /// out of bytes anywhere inside an event is a [`TimerError::Corrupt`]
    /// error, as is an unknown kind tag.
    ///
    /// # Example
    /// ```
    /// use timerlog::event::{EventKind, TimerEvent};
    ///
    /// let bytes = TimerEvent::start("load", 42).to_bytes().unwrap();
    /// let mut reader = &bytes[..];
    /// let event = TimerEvent::decode(&mut reader).unwrap().unwrap();
    /// assert_eq!(event.kind, EventKind::Start);
    /// assert_eq!(event.timestamp, 42);
    /// assert!(TimerEvent::decode(&mut reader).unwrap().is_none());
    /// ```
    pub fn decode<R: BufRead>(reader: &mut R) -> Result<Option<TimerEvent>> {
        let mut name_buf = Vec::new();
        let read = reader
            .read_until(NAME_TERMINATOR, &mut name_buf)
            .map_err(|e| TimerError::io("<log source>", e))?;

        if read == 0 {
            return Ok(None);
        }
        if name_buf.last() != Some(&NAME_TERMINATOR) {
            return Err(TimerError::corrupt(
                "stream",
                "unexpected end of stream inside timer name",
            ));
        }
        name_buf.pop();

        let name = String::from_utf8(name_buf)
            .map_err(|_| TimerError::corrupt("stream", "timer name is not valid UTF-8"))?;

        let mut tag = [0u8; 1];
        read_exact_or_corrupt(reader, &mut tag, "kind tag", &name)?;
        let kind = EventKind::from_tag(tag[0]).ok_or_else(|| {
            TimerError::corrupt(
                "stream",
                format!("unknown kind tag 0x{:02x} for timer {}", tag[0], name),
            )
        })?;

        let mut ts = [0u8; TIMESTAMP_LEN];
        read_exact_or_corrupt(reader, &mut ts, "timestamp", &name)?;

        Ok(Some(TimerEvent {
            name,
            kind,
            timestamp: i64::from_le_bytes(ts),
        }))
    }
}

fn read_exact_or_corrupt<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    field: &str,
    name: &str,
) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => TimerError::corrupt(
            "stream",
            format!("unexpected end of stream reading {} of timer {}", field, name),
        ),
        _ => TimerError::io("<log source>", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let bytes = TimerEvent::end("ab", 1).to_bytes().unwrap();
        assert_eq!(bytes, vec![b'a', b'b', 0, b'e', 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_negative_timestamp_little_endian() {
        let bytes = TimerEvent::start("x", -1).to_bytes().unwrap();
        assert_eq!(&bytes[3..], &[0xff; 8]);
    }

    #[test]
    fn test_encoded_len_matches_bytes() {
        let event = TimerEvent::start("parse_config", 7);
        assert_eq!(event.encoded_len(), event.to_bytes().unwrap().len());
    }

    #[test]
    fn test_encode_rejects_nul_before_writing() {
        let mut sink = Vec::new();
        let err = TimerEvent::start("bad\0name", 1).encode(&mut sink).unwrap_err();
        assert!(matches!(err, TimerError::InvalidName(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_decode_empty_stream_is_clean_end() {
        let mut reader: &[u8] = &[];
        assert!(TimerEvent::decode(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_decode_empty_name() {
        let bytes = TimerEvent::start("", 5).to_bytes().unwrap();
        let event = TimerEvent::decode(&mut &bytes[..]).unwrap().unwrap();
        assert_eq!(event.name, "");
        assert_eq!(event.timestamp, 5);
    }

    #[test]
    fn test_decode_name_without_terminator_is_corrupt() {
        let mut reader: &[u8] = b"dangling";
        let err = TimerEvent::decode(&mut reader).unwrap_err();
        assert!(matches!(err, TimerError::Corrupt { .. }));
    }

    #[test]
    fn test_decode_missing_kind_is_corrupt() {
        let mut reader: &[u8] = b"t\0";
        let err = TimerEvent::decode(&mut reader).unwrap_err();
        assert!(matches!(err, TimerError::Corrupt { .. }));
    }

    #[test]
    fn test_decode_short_timestamp_is_corrupt() {
        let mut bytes = TimerEvent::start("t", 99).to_bytes().unwrap();
        bytes.truncate(bytes.len() - 3);
        let err = TimerEvent::decode(&mut &bytes[..]).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_decode_unknown_tag_is_corrupt() {
        let mut bytes = TimerEvent::start("t", 99).to_bytes().unwrap();
        bytes[2] = b'x';
        let err = TimerEvent::decode(&mut &bytes[..]).unwrap_err();
        assert!(err.to_string().contains("0x78"));
    }

    #[test]
    fn test_decode_sequence_of_events() {
        let mut bytes = Vec::new();
        TimerEvent::start("a", 1).encode(&mut bytes).unwrap();
        TimerEvent::end("a", 2).encode(&mut bytes).unwrap();

        let mut reader = &bytes[..];
        let first = TimerEvent::decode(&mut reader).unwrap().unwrap();
        let second = TimerEvent::decode(&mut reader).unwrap().unwrap();
        assert_eq!(first, TimerEvent::start("a", 1));
        assert_eq!(second, TimerEvent::end("a", 2));
        assert!(TimerEvent::decode(&mut reader).unwrap().is_none());
    }

    #[test]
    fn test_kind_tag_round_trip() {
        for kind in [EventKind::Start, EventKind::End] {
            assert_eq!(EventKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EventKind::from_tag(0), None);
    }
}
