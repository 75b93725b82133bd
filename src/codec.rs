//! Codec dispatch and stream frame delimiting.
//!
//! [`parse_frame`] interprets one validated frame according to its codec
//! identifier. [`TeltonikaFrameCodec`] sits below it at the transport
//! boundary, slicing complete frames out of a raw TCP byte stream without
//! interpreting them.

use std::io;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::frame::{
    CodecId, TeltonikaCodecContext, CHECKSUM_FIELD_LEN, HANDSHAKE_LEN, HANDSHAKE_PREFIX,
    PAYLOAD_OFFSET, PREAMBLE,
};
use crate::records::{avl, text, DecodedFrame};

/// Decode one complete data frame for the device identified by `imei`.
///
/// The codec identifier is the first payload byte of the envelope and
/// selects the record grammar. An identifier outside the supported set is a
/// hard error; the connection is speaking a sub-protocol this decoder does
/// not understand. Record-level failures never surface here, they become
/// malformed entries inside the returned frame.
pub fn parse_frame(imei: &str, raw: &Bytes) -> Result<DecodedFrame, ProtocolError> {
    let codec_byte = *raw
        .get(PAYLOAD_OFFSET)
        .ok_or(ProtocolError::PacketTooShort(raw.len()))?;
    let codec_id = CodecId::try_from(codec_byte)?;

    let ctx = TeltonikaCodecContext::new(codec_id);
    let records = match codec_id {
        CodecId::Avl | CodecId::AvlExtended => avl::decode_avl_frame(raw, &ctx),
        CodecId::TextExchange => text::decode_text_exchange(raw),
        CodecId::Ussd => text::decode_ussd(raw),
        CodecId::ServerCommand => text::decode_server_command(raw),
        CodecId::CommandOnly => text::decode_command_only(raw),
    };

    Ok(DecodedFrame {
        imei: imei.to_owned(),
        codec_id,
        codec_name: codec_id.display_name(),
        records,
    })
}

/// Documented ceiling for one AVL data packet.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1280;

/// Tuning knobs for [`TeltonikaFrameCodec`].
#[derive(Debug, Clone, Copy)]
pub struct FrameCodecConfig {
    /// Largest complete frame the codec will buffer before giving up on the
    /// stream.
    pub max_frame_len: usize,
}

impl Default for FrameCodecConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Frame delimiter for a raw device byte stream.
///
/// Emits one complete frame per decode, either the 17-byte IMEI handshake
/// or a data envelope whose size is derived from the declared payload
/// length. Frames are not interpreted here; feed them to
/// [`preparse`](crate::frame::preparse) and [`parse_frame`]. The encoder
/// side writes raw bytes (handshake acknowledgments, outbound commands).
#[derive(Debug, Default)]
pub struct TeltonikaFrameCodec {
    config: FrameCodecConfig,
}

impl TeltonikaFrameCodec {
    pub fn new(config: FrameCodecConfig) -> Self {
        Self { config }
    }
}

impl Decoder for TeltonikaFrameCodec {
    type Item = Bytes;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, io::Error> {
        if src.len() < 2 {
            return Ok(None);
        }
        if src[..2] == HANDSHAKE_PREFIX {
            if src.len() < HANDSHAKE_LEN {
                return Ok(None);
            }
            return Ok(Some(src.split_to(HANDSHAKE_LEN).freeze()));
        }

        if src.len() < PAYLOAD_OFFSET {
            return Ok(None);
        }
        if src[..4] != PREAMBLE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                ProtocolError::InvalidPreamble.to_string(),
            ));
        }
        let declared = u32::from_be_bytes([src[4], src[5], src[6], src[7]]) as usize;
        let total = PAYLOAD_OFFSET + declared + CHECKSUM_FIELD_LEN;
        if total > self.config.max_frame_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "frame of {total} bytes exceeds limit of {}",
                    self.config.max_frame_len
                ),
            ));
        }
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }
        Ok(Some(src.split_to(total).freeze()))
    }
}

impl Encoder<Bytes> for TeltonikaFrameCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<(), io::Error> {
        dst.reserve(item.remaining());
        dst.put_slice(&item);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(bytes: &[u8]) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.extend_from_slice(bytes);
        buf
    }

    #[test]
    fn handshake_is_split_at_seventeen_bytes() {
        let mut codec = TeltonikaFrameCodec::default();
        let mut frame = vec![0x00, 0x0F];
        frame.extend_from_slice(b"352093081452251");
        frame.extend_from_slice(&[0xAA, 0xBB]); // Next frame begins.

        let mut buf = feed(&frame);
        let out = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(out.len(), HANDSHAKE_LEN);
        assert_eq!(&out[2..], b"352093081452251");
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn partial_input_yields_none() {
        let mut codec = TeltonikaFrameCodec::default();
        // Data envelope declaring 15 payload bytes, delivered short.
        let mut buf = feed(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0F, 0x0C]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 9);
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let mut codec = TeltonikaFrameCodec::new(FrameCodecConfig { max_frame_len: 64 });
        let mut buf = feed(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
        let err = codec.decode(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn desynchronized_stream_is_an_error() {
        let mut codec = TeltonikaFrameCodec::default();
        let mut buf = feed(&[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x00, 0x00, 0x00]);
        assert!(codec.decode(&mut buf).is_err());
    }
}
