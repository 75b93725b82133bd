//! Envelope pre-parsing and the IMEI handshake.
//!
//! The pre-parser is the first consumer of every complete frame delivered by
//! the transport layer. It recognizes the one-shot IMEI handshake, enforces
//! the envelope structure of data frames (zero preamble, declared length,
//! trailing checksum) and hands the validated inner payload to the codec
//! dispatcher. All failures are returned as [`ProtocolError`] values; nothing
//! here panics on wire input.

use crate::crc::crc16_ibm;
use crate::error::ProtocolError;
use crate::session::ImeiRegistry;
use bytes::Bytes;

pub mod builder;
pub mod defs;

pub use builder::*;
pub use defs::*;

/// Outcome of pre-parsing one complete frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreParsed {
    /// The frame was an IMEI handshake. `ack` must be written back to the
    /// originating socket by the transport layer.
    Handshake { imei: String, ack: Bytes },
    /// The frame was a validated data envelope. `payload` is a zero-copy
    /// view of the inner payload, starting at the codec identifier byte.
    Data { imei: String, payload: Bytes },
}

impl PreParsed {
    /// IMEI the frame was attributed to.
    pub fn imei(&self) -> &str {
        match self {
            PreParsed::Handshake { imei, .. } | PreParsed::Data { imei, .. } => imei,
        }
    }
}

/// Pre-parse one complete frame received on `connection_id`.
///
/// A 17-byte buffer opening with `0x00 0x0F` is treated as the handshake:
/// the remaining 15 bytes are the ASCII IMEI, which is registered against
/// the connection, and a one-byte acknowledgment is returned for the host to
/// write back. Any other buffer must be a data envelope on an
/// already-identified connection; its structure and checksum are validated
/// and the inner payload extracted.
///
/// The registry is owned by the caller and shared across connections; see
/// [`ImeiRegistry`] for the synchronization and eviction contract.
pub fn preparse(
    buffer: &Bytes,
    connection_id: &str,
    registry: &mut ImeiRegistry,
) -> Result<PreParsed, ProtocolError> {
    if buffer.len() == HANDSHAKE_LEN && buffer[..2] == HANDSHAKE_PREFIX {
        let imei_bytes = &buffer[2..];
        if !imei_bytes.is_ascii() {
            return Err(ProtocolError::InvalidImei);
        }
        // Lossless here: the bytes were just checked to be ASCII.
        let imei = String::from_utf8_lossy(imei_bytes).into_owned();
        registry.register(connection_id, &imei);
        tracing::debug!(connection_id, imei = %imei, "handshake accepted");
        return Ok(PreParsed::Handshake {
            imei,
            ack: Bytes::from_static(&[HANDSHAKE_ACK]),
        });
    }

    let imei = registry
        .imei_for(connection_id)
        .ok_or(ProtocolError::ImeiNotRegistered)?
        .to_owned();

    if buffer.len() < MIN_DATA_FRAME_LEN {
        return Err(ProtocolError::PacketTooShort(buffer.len()));
    }
    if buffer[..4] != PREAMBLE {
        return Err(ProtocolError::InvalidPreamble);
    }

    let declared_len = u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]) as usize;
    let payload_end = PAYLOAD_OFFSET + declared_len;
    let checksum_end = payload_end + CHECKSUM_FIELD_LEN;
    if buffer.len() < checksum_end {
        return Err(ProtocolError::IncompleteChecksum {
            needed: checksum_end,
            len: buffer.len(),
        });
    }

    let payload = buffer.slice(PAYLOAD_OFFSET..payload_end);
    // Only the low 16 bits of the 4-byte checksum field are significant.
    let received = u16::from_be_bytes([buffer[payload_end + 2], buffer[payload_end + 3]]);
    let expected = crc16_ibm(&payload);
    if received != expected {
        tracing::warn!(
            connection_id,
            expected = format_args!("{expected:#06X}"),
            received = format_args!("{received:#06X}"),
            "envelope CRC mismatch"
        );
        return Err(ProtocolError::CrcMismatch { expected, received });
    }

    Ok(PreParsed::Data { imei, payload })
}
