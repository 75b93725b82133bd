//! Decoded record model shared by all codecs.
//!
//! A data frame decodes into a [`DecodedFrame`] holding one [`Record`] per
//! on-wire record. A record that cannot be decoded becomes a
//! [`Record::Malformed`] entry in place, preserving any siblings that were
//! already decoded from the same frame.

use crate::error::ProtocolError;
use crate::frame::CodecId;
use serde::{Deserialize, Serialize};

pub mod avl;
pub mod text;

pub use avl::{AvlRecord, GpsElement, IoElements, IoPair};
pub use text::{CommandOnlyRecord, ServerCommandRecord, TextExchangeRecord, UssdRecord};

/// One decoded record of a data frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Avl(AvlRecord),
    TextExchange(TextExchangeRecord),
    Ussd(UssdRecord),
    ServerCommand(ServerCommandRecord),
    CommandOnly(CommandOnlyRecord),
    Malformed(MalformedRecord),
}

impl Record {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Record::Malformed(_))
    }
}

/// Placeholder entry for a record that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedRecord {
    /// Human-readable decode failure description.
    pub reason: String,
}

impl From<ProtocolError> for Record {
    fn from(err: ProtocolError) -> Self {
        Record::Malformed(MalformedRecord {
            reason: err.to_string(),
        })
    }
}

/// Result of decoding one complete data frame for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedFrame {
    /// IMEI the connection handshook with.
    pub imei: String,
    /// Codec the payload was dispatched under.
    pub codec_id: CodecId,
    /// Display name of the codec, e.g. `"Codec 08"`.
    pub codec_name: String,
    pub records: Vec<Record>,
}

/// Bounds-checked big-endian reader over a record buffer.
///
/// Every accessor returns [`ProtocolError::MalformedRecord`] instead of
/// panicking when the buffer runs out, so decoders can turn truncation into
/// a [`Record::Malformed`] entry.
pub(crate) struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    /// Bytes consumed so far, relative to the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ProtocolError> {
        let end = self.pos.checked_add(n).ok_or_else(|| {
            ProtocolError::MalformedRecord("field length overflows buffer offset".into())
        })?;
        if end > self.buf.len() {
            return Err(ProtocolError::MalformedRecord(format!(
                "record truncated at offset {} (need {} more bytes, have {})",
                self.pos,
                n,
                self.buf.len().saturating_sub(self.pos)
            )));
        }
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, ProtocolError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u32(&mut self) -> Result<u32, ProtocolError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(self.u32()? as i32)
    }

    pub fn u64(&mut self) -> Result<u64, ProtocolError> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Big-endian unsigned value of `width` bytes (1, 2, 4 or 8), widened
    /// to `u64`.
    pub fn uint(&mut self, width: usize) -> Result<u64, ProtocolError> {
        let bytes = self.take(width)?;
        let mut value = 0u64;
        for &byte in bytes {
            value = (value << 8) | byte as u64;
        }
        Ok(value)
    }
}
