use arpscout_common::network::addr::Addr4;
use pnet::packet::ipv4::Ipv4Packet;

use crate::checksum::internet_checksum;
use crate::frame::DecodeError;

pub const MIN_HEADER_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    pub version: u8,
    /// Header length in 32-bit words.
    pub ihl: u8,
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub flags: u8,
    pub frag_offset: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    /// Checksum computed over the received header, `0` if it is intact.
    pub checksum_calc: u16,
    pub source: Addr4,
    pub destination: Addr4,
}

impl Ipv4Header {
    pub fn header_len(&self) -> usize {
        usize::from(self.ihl) * 4
    }

    pub fn checksum_ok(&self) -> bool {
        self.checksum_calc == 0
    }

    /// Splits `data` into the header and its payload.
    ///
    /// The payload ends at `total_len`, so ethernet padding is cut off.
    pub fn decode(data: &[u8]) -> Result<(Ipv4Header, &[u8]), DecodeError> {
        let ip = Ipv4Packet::new(data).ok_or(DecodeError::Truncated {
            layer: "ipv4",
            need: MIN_HEADER_LEN,
            have: data.len(),
        })?;

        let ihl = ip.get_header_length();
        let header_len = usize::from(ihl) * 4;
        if header_len < MIN_HEADER_LEN {
            return Err(DecodeError::Unsupported(format!("IPv4 IHL of {ihl}")));
        }
        DecodeError::ensure_len("ipv4 options", data, header_len)?;

        let header = Ipv4Header {
            version: ip.get_version(),
            ihl,
            tos: (ip.get_dscp() << 2) | ip.get_ecn(),
            total_len: ip.get_total_length(),
            id: ip.get_identification(),
            flags: ip.get_flags(),
            frag_offset: ip.get_fragment_offset(),
            ttl: ip.get_ttl(),
            protocol: ip.get_next_level_protocol().0,
            checksum: ip.get_checksum(),
            checksum_calc: internet_checksum(&data[..header_len]),
            source: ip.get_source().into(),
            destination: ip.get_destination().into(),
        };

        let end = usize::from(header.total_len).clamp(header_len, data.len());
        Ok((header, &data[header_len..end]))
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
