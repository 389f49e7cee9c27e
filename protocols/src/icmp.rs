use pnet::packet::icmp::IcmpPacket;

use crate::checksum::internet_checksum;
use crate::frame::DecodeError;

pub const ICMP_HDR_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
    pub checksum: u16,
    /// Checksum over header and data, `0` if intact.
    pub checksum_calc: u16,
}

impl IcmpHeader {
    pub fn checksum_ok(&self) -> bool {
        self.checksum_calc == 0
    }

    pub fn decode(data: &[u8]) -> Result<(IcmpHeader, &[u8]), DecodeError> {
        DecodeError::ensure_len("icmp", data, ICMP_HDR_LEN)?;
        let icmp = IcmpPacket::new(data).ok_or(DecodeError::Truncated {
            layer: "icmp",
            need: ICMP_HDR_LEN,
            have: data.len(),
        })?;

        let header = IcmpHeader {
            icmp_type: icmp.get_icmp_type().0,
            code: icmp.get_icmp_code().0,
            checksum: icmp.get_checksum(),
            checksum_calc: internet_checksum(data),
        };
        Ok((header, &data[ICMP_HDR_LEN..]))
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
