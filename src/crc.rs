//! The two CRC-16 algorithms used by the Teltonika protocol.
//!
//! Both are pure functions over a byte slice. They are distinct by protocol
//! design and must never be substituted for each other: the envelope of every
//! inbound data frame is protected by [`crc16_ibm`], while outbound device
//! commands are protected by [`crc16_arc`].

/// Envelope CRC: CRC-16 with initial value 0xFFFF and polynomial 0x1021,
/// processed most-significant-bit first.
///
/// Each input byte is XOR'd into the high byte of the running register before
/// the eight shift rounds. Used to validate every inbound data frame (the
/// IMEI handshake frame carries no checksum).
pub fn crc16_ibm(data: &[u8]) -> u16 {
    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Command CRC: CRC-16/ARC with initial value 0x0000 and reflected
/// polynomial 0xA001, processed least-significant-bit first.
///
/// Used only when constructing outbound device commands.
pub fn crc16_arc(data: &[u8]) -> u16 {
    let mut crc: u16 = 0x0000;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ibm_matches_ccitt_false_check_value() {
        // CRC-16/CCITT-FALSE reference check value for "123456789".
        assert_eq!(crc16_ibm(b"123456789"), 0x29B1);
    }

    #[test]
    fn arc_matches_reference_check_value() {
        // CRC-16/ARC reference check value for "123456789".
        assert_eq!(crc16_arc(b"123456789"), 0xBB3D);
    }

    #[test]
    fn arc_matches_known_command_body() {
        // Body of the Codec 12 "getinfo" command frame; trailing checksum on
        // the wire is 0x4312.
        let body = [
            0x0C, 0x01, 0x05, 0x00, 0x00, 0x00, 0x07, b'g', b'e', b't', b'i', b'n', b'f', b'o',
            0x01,
        ];
        assert_eq!(crc16_arc(&body), 0x4312);
    }

    #[test]
    fn both_are_stable_and_distinct() {
        let data = b"teltonika";
        assert_eq!(crc16_ibm(data), crc16_ibm(data));
        assert_eq!(crc16_arc(data), crc16_arc(data));
        assert_ne!(crc16_ibm(data), crc16_arc(data));
    }

    #[test]
    fn empty_input_yields_initial_register() {
        assert_eq!(crc16_ibm(&[]), 0xFFFF);
        assert_eq!(crc16_arc(&[]), 0x0000);
    }
}
