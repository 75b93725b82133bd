//! AVL telemetry record decoding for Codec 8 and Codec 8 Extended.

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordReader};
use crate::error::ProtocolError;
use crate::frame::{TeltonikaCodecContext, PAYLOAD_OFFSET};
use crate::wire::WireDecode;

/// GPS element of an AVL record.
///
/// Coordinates arrive as signed 32-bit integers scaled by 1e7 and are
/// exposed in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsElement {
    pub longitude: f64,
    pub latitude: f64,
    /// Meters above sea level.
    pub altitude: u16,
    /// Heading in degrees, 0 pointing north.
    pub angle: u16,
    pub satellites: u8,
    /// Speed in km/h; 0 when no GPS fix.
    pub speed: u16,
}

/// One I/O property: a 1-byte identifier and its big-endian unsigned value,
/// widened to `u64` regardless of on-wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoPair {
    pub id: u8,
    pub value: u64,
}

/// I/O element block of an AVL record, grouped by on-wire value width.
///
/// Order within each list follows the wire, and duplicate identifiers are
/// preserved as-is rather than collapsed into a map.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IoElements {
    pub n1: Vec<IoPair>,
    pub n2: Vec<IoPair>,
    pub n4: Vec<IoPair>,
    pub n8: Vec<IoPair>,
}

impl IoElements {
    /// Total number of decoded I/O pairs across all width classes.
    pub fn len(&self) -> usize {
        self.n1.len() + self.n2.len() + self.n4.len() + self.n8.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One AVL telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvlRecord {
    pub timestamp: DateTime<Utc>,
    pub priority: u8,
    pub gps: GpsElement,
    /// Identifier of the I/O property that triggered this record, 0 for
    /// periodic records.
    pub event_io_id: u8,
    /// Declared number of I/O properties. Carried through as received and
    /// not cross-checked against the decoded lists.
    pub total_io: u8,
    pub io: IoElements,
}

const IO_WIDTHS: [usize; 4] = [1, 2, 4, 8];

impl WireDecode for AvlRecord {
    type Error = ProtocolError;
    type Context = TeltonikaCodecContext;

    fn parse<'a>(
        input: &'a [u8],
        _parent: &Bytes,
        _ctx: &Self::Context,
    ) -> Result<(&'a [u8], Self), Self::Error> {
        let mut reader = RecordReader::new(input);

        let millis = reader.u64()?;
        let timestamp = i64::try_from(millis)
            .ok()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| {
                ProtocolError::MalformedRecord(format!("timestamp {millis} out of range"))
            })?;
        let priority = reader.u8()?;

        let longitude = reader.i32()? as f64 / 1e7;
        let latitude = reader.i32()? as f64 / 1e7;
        let gps = GpsElement {
            longitude,
            latitude,
            altitude: reader.u16()?,
            angle: reader.u16()?,
            satellites: reader.u8()?,
            speed: reader.u16()?,
        };

        let event_io_id = reader.u8()?;
        let total_io = reader.u8()?;

        let mut io = IoElements::default();
        for width in IO_WIDTHS {
            let count = reader.u8()?;
            let list = match width {
                1 => &mut io.n1,
                2 => &mut io.n2,
                4 => &mut io.n4,
                _ => &mut io.n8,
            };
            list.reserve(count as usize);
            for _ in 0..count {
                let id = reader.u8()?;
                let value = reader.uint(width)?;
                list.push(IoPair { id, value });
            }
        }

        if io.len() != total_io as usize {
            tracing::debug!(
                declared = total_io,
                decoded = io.len(),
                "I/O count disagrees with declared total"
            );
        }

        let record = AvlRecord {
            timestamp,
            priority,
            gps,
            event_io_id,
            total_io,
            io,
        };
        Ok((&input[reader.position()..], record))
    }
}

/// Decode all records of a Codec 8 / Codec 8 Extended frame.
///
/// `raw` is the complete frame including envelope. The record count byte
/// follows the codec identifier; records are laid out back to back with no
/// per-record length prefix, so a record that fails to decode ends the walk.
/// Already-decoded siblings are kept and the failure is appended as a
/// [`Record::Malformed`] entry.
///
/// Codec 8 Extended frames are decoded with the same 1-byte I/O identifier
/// grammar as Codec 8. True Codec 8 Extended uses 2-byte identifiers and an
/// extra variable-width block; frames using those will decode into garbage
/// values or a malformed entry.
pub fn decode_avl_frame(raw: &Bytes, ctx: &TeltonikaCodecContext) -> Vec<Record> {
    let mut reader = RecordReader::at(raw, PAYLOAD_OFFSET);
    let count = match reader.u8().and_then(|_codec| reader.u8()) {
        Ok(count) => count,
        Err(err) => return vec![err.into()],
    };

    let mut records = Vec::with_capacity(count as usize);
    let mut rest = &raw[reader.position()..];
    for _ in 0..count {
        match AvlRecord::parse(rest, raw, ctx) {
            Ok((remaining, record)) => {
                rest = remaining;
                records.push(Record::Avl(record));
            }
            Err(err) => {
                records.push(err.into());
                break;
            }
        }
    }
    records
}
