//! Command-style record decoding for codecs 0x0C, 0x0D, 0x0E and 0x10.
//!
//! These codecs carry a single command or response body per frame rather
//! than a telemetry record stream. All four share the same shell: a record
//! count byte, a message type byte, a 4-byte body length, the body, a second
//! count byte and a trailing 2-byte checksum. The checksum is carried
//! through as received; the envelope pre-parser already validated the frame.

use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, RecordReader};
use crate::error::ProtocolError;
use crate::frame::MSG_TYPE_COMMAND;

/// Codec 12 ASCII command/response exchange body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextExchangeRecord {
    /// 0x05 for a command, 0x06 for a response.
    pub message_type: u8,
    pub text: String,
    /// Record count byte preceding the body.
    pub count1: u8,
    /// Record count byte following the body. Reported as received; the two
    /// counts are not required to agree.
    pub count2: u8,
    /// Trailing checksum as carried on the wire.
    pub crc: u16,
}

/// Codec 13 USSD-style response body with an embedded timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UssdRecord {
    pub message_type: u8,
    /// Declared body size, timestamp included.
    pub response_size: u32,
    /// Seconds-resolution timestamp embedded in the body.
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub count1: u8,
    pub count2: u8,
    pub crc: u16,
}

/// Codec 14 server command addressed to a specific device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCommandRecord {
    pub message_type: u8,
    /// Target IMEI rendered as exactly 16 hex digits.
    pub imei: String,
    pub command: String,
    pub count1: u8,
    pub count2: u8,
    pub crc: u16,
}

/// Codec 16 command body. Only message type 0x05 is decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOnlyRecord {
    pub message_type: u8,
    pub command_hex: String,
    pub command_ascii: String,
    pub count1: u8,
    pub count2: u8,
    pub crc: u16,
}

fn note_count_mismatch(codec: &str, count1: u8, count2: u8) {
    if count1 != count2 {
        tracing::debug!(codec, count1, count2, "record count bytes disagree");
    }
}

fn trailing_crc(raw: &[u8]) -> Result<u16, ProtocolError> {
    if raw.len() < 2 {
        return Err(ProtocolError::MalformedRecord(
            "frame too short for trailing checksum".into(),
        ));
    }
    Ok(u16::from_be_bytes([raw[raw.len() - 2], raw[raw.len() - 1]]))
}

/// Decode a Codec 12 frame into its single exchange record.
pub fn decode_text_exchange(raw: &Bytes) -> Vec<Record> {
    vec![parse_text_exchange(raw).map_or_else(Record::from, Record::TextExchange)]
}

fn parse_text_exchange(raw: &[u8]) -> Result<TextExchangeRecord, ProtocolError> {
    let mut reader = RecordReader::at(raw, 9);
    let count1 = reader.u8()?;
    let message_type = reader.u8()?;
    let text_len = reader.u32()? as usize;
    let text = String::from_utf8_lossy(reader.take(text_len)?).into_owned();
    let count2 = reader.u8()?;
    note_count_mismatch("0C", count1, count2);
    Ok(TextExchangeRecord {
        message_type,
        text,
        count1,
        count2,
        crc: trailing_crc(raw)?,
    })
}

/// Decode a Codec 13 frame into its single USSD record.
pub fn decode_ussd(raw: &Bytes) -> Vec<Record> {
    vec![parse_ussd(raw).map_or_else(Record::from, Record::Ussd)]
}

fn parse_ussd(raw: &[u8]) -> Result<UssdRecord, ProtocolError> {
    let mut reader = RecordReader::at(raw, 9);
    let count1 = reader.u8()?;
    let message_type = reader.u8()?;
    let response_size = reader.u32()?;
    let seconds = reader.u32()?;
    let timestamp = Utc
        .timestamp_opt(seconds as i64, 0)
        .single()
        .ok_or_else(|| {
            ProtocolError::MalformedRecord(format!("timestamp {seconds} out of range"))
        })?;
    // The declared size covers the 4-byte timestamp plus the text.
    let text_len = response_size.checked_sub(4).ok_or_else(|| {
        ProtocolError::MalformedRecord(format!(
            "response size {response_size} smaller than embedded timestamp"
        ))
    })? as usize;
    let text = String::from_utf8_lossy(reader.take(text_len)?).into_owned();
    let count2 = reader.u8()?;
    note_count_mismatch("0D", count1, count2);
    Ok(UssdRecord {
        message_type,
        response_size,
        timestamp,
        text,
        count1,
        count2,
        crc: trailing_crc(raw)?,
    })
}

/// Decode a Codec 14 frame into its single server command record.
pub fn decode_server_command(raw: &Bytes) -> Vec<Record> {
    vec![parse_server_command(raw).map_or_else(Record::from, Record::ServerCommand)]
}

fn parse_server_command(raw: &[u8]) -> Result<ServerCommandRecord, ProtocolError> {
    let mut reader = RecordReader::at(raw, 9);
    let count1 = reader.u8()?;
    let message_type = reader.u8()?;
    let command_size = reader.u32()?;
    let imei = hex::encode(reader.take(8)?);
    // The declared size covers the 8-byte IMEI plus the command text.
    let command_len = command_size.checked_sub(8).ok_or_else(|| {
        ProtocolError::MalformedRecord(format!(
            "command size {command_size} smaller than embedded IMEI"
        ))
    })? as usize;
    let command = String::from_utf8_lossy(reader.take(command_len)?).into_owned();
    let count2 = reader.u8()?;
    note_count_mismatch("0E", count1, count2);
    Ok(ServerCommandRecord {
        message_type,
        imei,
        command,
        count1,
        count2,
        crc: trailing_crc(raw)?,
    })
}

/// Decode a Codec 16 frame into its single command record.
///
/// Only the command sub-type (message type 0x05) is understood; any other
/// message type is reported as a malformed entry rather than decoded as
/// telemetry.
pub fn decode_command_only(raw: &Bytes) -> Vec<Record> {
    vec![parse_command_only(raw).map_or_else(Record::from, Record::CommandOnly)]
}

fn parse_command_only(raw: &[u8]) -> Result<CommandOnlyRecord, ProtocolError> {
    let mut reader = RecordReader::at(raw, 9);
    let count1 = reader.u8()?;
    let message_type = reader.u8()?;
    if message_type != MSG_TYPE_COMMAND {
        return Err(ProtocolError::MalformedRecord(format!(
            "unsupported message type {message_type:#04X} for this codec"
        )));
    }
    let command_size = reader.u32()? as usize;
    let command = reader.take(command_size)?;
    let count2 = reader.u8()?;
    note_count_mismatch("10", count1, count2);
    Ok(CommandOnlyRecord {
        message_type,
        command_hex: hex::encode(command),
        command_ascii: String::from_utf8_lossy(command).into_owned(),
        count1,
        count2,
        crc: trailing_crc(raw)?,
    })
}
