//! Decoder and encoder for the Teltonika vehicle-tracking TCP wire protocol.
//!
//! Teltonika terminals open a TCP connection, identify themselves once with
//! an IMEI handshake and then stream CRC-protected data frames, each carrying
//! records under one of several codecs. This crate implements the protocol
//! core for a tracking server:
//!
//! - [`codec::TeltonikaFrameCodec`] delimits complete frames on the byte
//!   stream,
//! - [`frame::preparse`] handles the handshake and validates the envelope,
//! - [`codec::parse_frame`] dispatches the payload to the per-codec record
//!   decoders in [`records`],
//! - [`frame::build_codec12_command`] constructs outbound device commands.
//!
//! Socket management, reconnection and record persistence are left to the
//! host. The crate installs no logging subscriber; diagnostics are emitted
//! through [`tracing`].

pub mod codec;
pub mod crc;
pub mod error;
pub mod frame;
pub mod records;
pub mod session;
pub mod wire;

pub use codec::{parse_frame, FrameCodecConfig, TeltonikaFrameCodec};
pub use error::{ProtocolError, Result};
pub use frame::{build_codec12_command, preparse, CodecId, DeviceCommand, PreParsed};
pub use records::{AvlRecord, DecodedFrame, Record};
pub use session::ImeiRegistry;
pub use wire::{WireDecode, WireEncode};
