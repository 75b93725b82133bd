use thiserror::Error;

/// Protocol-level error type for the Teltonika wire protocol.
///
/// This error intentionally distinguishes between envelope/framing failures,
/// handshake ordering violations, unsupported-codec dispatch and per-record
/// decode failures so that higher layers can map them into their own error
/// domains as needed. Unsupported-codec is the only condition a host should
/// treat as connection-fatal; everything else is recoverable per frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Buffer is shorter than the minimum data envelope.
    #[error("packet too short ({0} bytes)")]
    PacketTooShort(usize),
    /// The first four envelope bytes are not the zero preamble.
    #[error("invalid preamble")]
    InvalidPreamble,
    /// Declared payload length overruns the buffer before the checksum field.
    #[error("incomplete packet for checksum (need {needed} bytes, have {len})")]
    IncompleteChecksum { needed: usize, len: usize },
    /// Envelope checksum does not match the payload.
    #[error("invalid CRC (expected {expected:#06X}, received {received:#06X})")]
    CrcMismatch { expected: u16, received: u16 },
    /// A data frame arrived before the connection identified itself.
    #[error("IMEI not received before data")]
    ImeiNotRegistered,
    /// Handshake frame carries a non-ASCII IMEI field.
    #[error("invalid IMEI in handshake")]
    InvalidImei,
    /// Codec identifier outside the supported set.
    ///
    /// The connection is speaking an unrecognized sub-protocol; callers
    /// should usually terminate it rather than retry.
    #[error("unsupported codec {0:#04X}")]
    UnsupportedCodec(u8),
    /// A single record or command body could not be decoded.
    ///
    /// Reported per record; sibling records already decoded from the same
    /// frame are kept.
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    /// Outbound command text cannot be represented on the wire.
    #[error("command not encodable: {0}")]
    NotEncodable(String),
}

impl ProtocolError {
    /// Whether this error signals a connection speaking a protocol this
    /// decoder does not understand, as opposed to a recoverable bad frame.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(self, ProtocolError::UnsupportedCodec(_))
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
