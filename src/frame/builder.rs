//! Outbound Codec 12 command construction.

use bytes::{BufMut, Bytes};

use crate::crc::crc16_arc;
use crate::error::ProtocolError;
use crate::frame::{CHECKSUM_FIELD_LEN, MSG_TYPE_COMMAND, PREAMBLE};
use crate::wire::WireEncode;

// codec id + quantity + message type + 4-byte length + trailing quantity.
const COMMAND_BODY_OVERHEAD: usize = 8;

/// ASCII command to be delivered to a device over Codec 12.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCommand {
    text: String,
}

impl DeviceCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl WireEncode for DeviceCommand {
    type Error = ProtocolError;
    type Context = ();

    fn encoded_len(&self, _ctx: &()) -> usize {
        PREAMBLE.len() + 4 + COMMAND_BODY_OVERHEAD + self.text.len() + CHECKSUM_FIELD_LEN
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B, _ctx: &()) -> Result<(), ProtocolError> {
        if !self.text.is_ascii() {
            return Err(ProtocolError::NotEncodable(format!(
                "command text is not ASCII: {:?}",
                self.text
            )));
        }

        let mut body = Vec::with_capacity(COMMAND_BODY_OVERHEAD + self.text.len());
        body.put_u8(0x0C);
        body.put_u8(0x01);
        body.put_u8(MSG_TYPE_COMMAND);
        body.put_u32(self.text.len() as u32);
        body.put_slice(self.text.as_bytes());
        body.put_u8(0x01);

        dst.put_slice(&PREAMBLE);
        dst.put_u32(body.len() as u32);
        dst.put_slice(&body);
        // Checksum right-justified in the 4-byte trailing field.
        dst.put_u32(crc16_arc(&body) as u32);
        Ok(())
    }
}

/// Build a complete Codec 12 command frame around `text`.
///
/// The output is ready to write to the device socket. Building the same
/// command twice yields identical bytes.
pub fn build_codec12_command(text: &str) -> Result<Bytes, ProtocolError> {
    DeviceCommand::new(text).encode_bytes(&())
}
