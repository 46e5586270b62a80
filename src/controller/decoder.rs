//! # Input Event Decoder
//!
//! Decodes fixed-size evdev records read from `/dev/input/eventX` into
//! [`InputEvent`]s.
//!
//! ## Record Layouts
//!
//! | Layout | Size | Fields (little-endian) |
//! |--------|------|------------------------|
//! | `Wide64` | 24 bytes | `i64 sec`, `i64 usec`, `u16 type`, `u16 code`, `u32 value` |
//! | `Compact32` | 16 bytes | `i32 sec`, `i32 usec`, `u16 type`, `u16 code`, `u32 value` |
//!
//! `Wide64` is the `struct input_event` of 64-bit Linux. The EV3 brick runs a
//! 32-bit ARM kernel where `long` is 4 bytes, which gives `Compact32`.
//!
//! ## Usage
//!
//! ```
//! use pad_drive::controller::decoder::{EventReader, ReadOutcome, RecordLayout};
//!
//! let mut reader = EventReader::new(std::io::empty(), RecordLayout::Wide64);
//! assert!(matches!(reader.next_event()?, ReadOutcome::EndOfStream));
//! # Ok::<(), pad_drive::error::PadDriveError>(())
//! ```

use bytes::Buf;
use evdev::EventType;
use serde::Deserialize;
use std::io::{ErrorKind, Read};
use tracing::debug;

use crate::error::Result;

/// Largest record size of any supported layout.
const MAX_RECORD_SIZE: usize = 24;

/// Binary layout of one event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// 64-bit timestamps (24-byte records).
    #[default]
    Wide64,
    /// 32-bit timestamps (16-byte records), as produced on the EV3.
    Compact32,
}

impl RecordLayout {
    /// Size of one record in bytes.
    #[must_use]
    pub const fn record_size(self) -> usize {
        match self {
            RecordLayout::Wide64 => 24,
            RecordLayout::Compact32 => 16,
        }
    }
}

/// Kernel timestamp attached to each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventTime {
    pub seconds: i64,
    pub micros: i64,
}

/// Event category, from the record's type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// EV_SYN report boundary.
    Sync,
    /// EV_KEY button press/release.
    Button,
    /// EV_ABS absolute axis position.
    Axis,
    /// Any other event type (EV_MSC, EV_FF, ...).
    Other(u16),
}

impl EventKind {
    /// Maps a raw evdev event type to its kind.
    #[must_use]
    pub fn from_raw(event_type: u16) -> Self {
        match EventType(event_type) {
            EventType::SYNCHRONIZATION => EventKind::Sync,
            EventType::KEY => EventKind::Button,
            EventType::ABSOLUTE => EventKind::Axis,
            _ => EventKind::Other(event_type),
        }
    }
}

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub time: EventTime,
    pub kind: EventKind,
    pub code: u16,
    pub value: u32,
}

impl InputEvent {
    /// Builds an event with a zero timestamp.
    #[must_use]
    pub fn new(kind: EventKind, code: u16, value: u32) -> Self {
        Self {
            time: EventTime::default(),
            kind,
            code,
            value,
        }
    }

    /// The value reinterpreted as signed (the d-pad reports -1 as `u32::MAX`).
    #[must_use]
    pub fn signed_value(&self) -> i32 {
        self.value as i32
    }
}

/// Decodes one record.
///
/// Returns `None` when `record` holds fewer bytes than the layout needs.
/// Extra trailing bytes are ignored.
///
/// # Examples
///
/// ```
/// use pad_drive::controller::decoder::{decode, EventKind, RecordLayout};
///
/// let mut record = [0u8; 16];
/// record[8..10].copy_from_slice(&3u16.to_le_bytes()); // EV_ABS
/// record[10..12].copy_from_slice(&4u16.to_le_bytes()); // ABS_RY
/// record[12..16].copy_from_slice(&200u32.to_le_bytes());
///
/// let event = decode(RecordLayout::Compact32, &record).unwrap();
/// assert_eq!(event.kind, EventKind::Axis);
/// assert_eq!(event.code, 4);
/// assert_eq!(event.value, 200);
///
/// assert!(decode(RecordLayout::Compact32, &record[..10]).is_none());
/// ```
#[must_use]
pub fn decode(layout: RecordLayout, record: &[u8]) -> Option<InputEvent> {
    if record.len() < layout.record_size() {
        return None;
    }

    let mut buf = &record[..layout.record_size()];
    let time = match layout {
        RecordLayout::Wide64 => EventTime {
            seconds: buf.get_i64_le(),
            micros: buf.get_i64_le(),
        },
        RecordLayout::Compact32 => EventTime {
            seconds: i64::from(buf.get_i32_le()),
            micros: i64::from(buf.get_i32_le()),
        },
    };
    let event_type = buf.get_u16_le();
    let code = buf.get_u16_le();
    let value = buf.get_u32_le();

    Some(InputEvent {
        time,
        kind: EventKind::from_raw(event_type),
        code,
        value,
    })
}

/// Result of a single blocking read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A complete record was decoded.
    Event(InputEvent),
    /// The source closed, or ended inside a record.
    EndOfStream,
}

/// Reads records one at a time from a blocking byte source.
#[derive(Debug)]
pub struct EventReader<R> {
    source: R,
    layout: RecordLayout,
    records_read: u64,
}

impl<R: Read> EventReader<R> {
    /// Wraps a byte source.
    pub fn new(source: R, layout: RecordLayout) -> Self {
        Self {
            source,
            layout,
            records_read: 0,
        }
    }

    /// Record layout in use.
    #[must_use]
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Number of complete records decoded so far.
    #[must_use]
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// Blocks until one full record is available or the source ends.
    ///
    /// A source that yields fewer bytes than one record before closing is
    /// reported as [`ReadOutcome::EndOfStream`]; the partial bytes are dropped.
    ///
    /// # Errors
    ///
    /// Returns `Io` for read failures other than end-of-file and interrupts.
    pub fn next_event(&mut self) -> Result<ReadOutcome> {
        let size = self.layout.record_size();
        let mut record = [0u8; MAX_RECORD_SIZE];
        let mut filled = 0;

        while filled < size {
            match self.source.read(&mut record[filled..size]) {
                Ok(0) => {
                    if filled > 0 {
                        debug!("Dropping partial record ({} of {} bytes)", filled, size);
                    }
                    return Ok(ReadOutcome::EndOfStream);
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Ok(ReadOutcome::EndOfStream);
                }
                Err(e) => return Err(e.into()),
            }
        }

        match decode(self.layout, &record[..size]) {
            Some(event) => {
                self.records_read += 1;
                Ok(ReadOutcome::Event(event))
            }
            None => Ok(ReadOutcome::EndOfStream),
        }
    }
}

/// Encodes an event in the given layout. Used to build test streams.
#[cfg(test)]
pub(crate) fn encode(layout: RecordLayout, event: &InputEvent) -> Vec<u8> {
    let event_type: u16 = match event.kind {
        EventKind::Sync => 0,
        EventKind::Button => 1,
        EventKind::Axis => 3,
        EventKind::Other(t) => t,
    };
    let mut out = Vec::with_capacity(layout.record_size());
    match layout {
        RecordLayout::Wide64 => {
            out.extend_from_slice(&event.time.seconds.to_le_bytes());
            out.extend_from_slice(&event.time.micros.to_le_bytes());
        }
        RecordLayout::Compact32 => {
            out.extend_from_slice(&(event.time.seconds as i32).to_le_bytes());
            out.extend_from_slice(&(event.time.micros as i32).to_le_bytes());
        }
    }
    out.extend_from_slice(&event_type.to_le_bytes());
    out.extend_from_slice(&event.code.to_le_bytes());
    out.extend_from_slice(&event.value.to_le_bytes());
    out
}
