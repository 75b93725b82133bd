use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};

/// Zero preamble opening every data envelope.
pub const PREAMBLE: [u8; 4] = [0x00, 0x00, 0x00, 0x00];

/// First two bytes of an IMEI handshake frame: big-endian length 15.
pub const HANDSHAKE_PREFIX: [u8; 2] = [0x00, 0x0F];

/// Total size of an IMEI handshake frame: 2-byte prefix + 15 ASCII digits.
pub const HANDSHAKE_LEN: usize = 17;

/// Length of the ASCII IMEI carried in the handshake.
pub const IMEI_LEN: usize = 15;

/// Acknowledgment byte written back to the device after a valid handshake.
pub const HANDSHAKE_ACK: u8 = 0x01;

/// Smallest buffer a data envelope can occupy.
pub const MIN_DATA_FRAME_LEN: usize = 18;

/// Offset of the first payload byte (the codec identifier) in the envelope.
pub const PAYLOAD_OFFSET: usize = 8;

/// Size of the trailing checksum field. Only the low 16 bits are
/// semantically meaningful; the high two bytes are zero padding by
/// convention.
pub const CHECKSUM_FIELD_LEN: usize = 4;

/// Message type marking a server-to-device command body.
pub const MSG_TYPE_COMMAND: u8 = 0x05;

/// Message type marking a device-to-server response body.
pub const MSG_TYPE_RESPONSE: u8 = 0x06;

/// Closed set of codec identifiers this decoder understands.
///
/// The identifier is the first payload byte of every data envelope and
/// selects which grammar the rest of the payload follows. Anything outside
/// this set is a hard [`ProtocolError::UnsupportedCodec`] at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CodecId {
    /// Codec 8: basic AVL telemetry records.
    Avl = 0x08,
    /// Codec 8 Extended: AVL telemetry. This decoder reuses the basic
    /// 1-byte-id I/O block; the true extended layout with 2-byte I/O
    /// identifiers is not implemented.
    AvlExtended = 0x8E,
    /// Codec 12: plain ASCII command/response exchange.
    TextExchange = 0x0C,
    /// Codec 13: USSD-style response with an embedded timestamp.
    Ussd = 0x0D,
    /// Codec 14: server command addressed to a specific IMEI.
    ServerCommand = 0x0E,
    /// Codec 16: only the command sub-type (message type 0x05) is decoded.
    CommandOnly = 0x10,
}

impl CodecId {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Human-readable display name, e.g. `"Codec 8E"`.
    pub fn display_name(self) -> String {
        format!("Codec {:02X}", self.as_u8())
    }
}

impl TryFrom<u8> for CodecId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x08 => Ok(CodecId::Avl),
            0x8E => Ok(CodecId::AvlExtended),
            0x0C => Ok(CodecId::TextExchange),
            0x0D => Ok(CodecId::Ussd),
            0x0E => Ok(CodecId::ServerCommand),
            0x10 => Ok(CodecId::CommandOnly),
            other => Err(ProtocolError::UnsupportedCodec(other)),
        }
    }
}

/// Context for codec operations.
#[derive(Debug, Clone, Copy)]
pub struct TeltonikaCodecContext {
    /// Codec the payload was dispatched under.
    pub codec: CodecId,
}

impl TeltonikaCodecContext {
    pub fn new(codec: CodecId) -> Self {
        Self { codec }
    }
}
