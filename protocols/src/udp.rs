use pnet::packet::udp::UdpPacket;

use crate::checksum::internet_checksum;
use crate::frame::DecodeError;

pub const UDP_HDR_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    /// Header plus data.
    pub length: u16,
    pub checksum: u16,
    /// Plain checksum over header and data. Without the pseudo header this does not verify
    /// to zero, it is only shown for comparison.
    pub checksum_calc: u16,
}

impl UdpHeader {
    pub fn data_len(&self) -> usize {
        usize::from(self.length).saturating_sub(UDP_HDR_LEN)
    }

    /// Returns the header, the data and any trailing padding.
    pub fn decode(data: &[u8]) -> Result<(UdpHeader, &[u8], &[u8]), DecodeError> {
        let udp = UdpPacket::new(data).ok_or(DecodeError::Truncated {
            layer: "udp",
            need: UDP_HDR_LEN,
            have: data.len(),
        })?;

        let length = udp.get_length();
        if usize::from(length) < UDP_HDR_LEN {
            return Err(DecodeError::Unsupported(format!("UDP length of {length}")));
        }
        DecodeError::ensure_len("udp data", data, usize::from(length))?;

        let end = usize::from(length);
        let header = UdpHeader {
            src_port: udp.get_source(),
            dst_port: udp.get_destination(),
            length,
            checksum: udp.get_checksum(),
            checksum_calc: internet_checksum(&data[..end]),
        };
        Ok((header, &data[UDP_HDR_LEN..end], &data[end..]))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn datagram(payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&5353u16.to_be_bytes());
        data.extend_from_slice(&53u16.to_be_bytes());
        data.extend_from_slice(&((UDP_HDR_LEN + payload.len()) as u16).to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn splits_data_and_padding() {
        let mut data = datagram(b"abc");
        data.extend_from_slice(&[0, 0, 7]);

        let (header, payload, padding) = UdpHeader::decode(&data).unwrap();
        assert_eq!(header.src_port, 5353);
        assert_eq!(header.dst_port, 53);
        assert_eq!(header.length, 11);
        assert_eq!(header.data_len(), 3);
        assert_eq!(payload, b"abc");
        assert_eq!(padding, &[0, 0, 7]);
    }

    #[test]
    fn rejects_inconsistent_length() {
        let mut data = datagram(b"abc");
        data[4..6].copy_from_slice(&64u16.to_be_bytes());
        assert!(matches!(UdpHeader::decode(&data), Err(DecodeError::Truncated { .. })));

        data[4..6].copy_from_slice(&4u16.to_be_bytes());
        assert!(matches!(UdpHeader::decode(&data), Err(DecodeError::Unsupported(_))));
    }
}
