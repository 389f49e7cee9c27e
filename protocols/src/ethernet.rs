use anyhow::Context;
use arpscout_common::network::mac::HardwareAddr;
use pnet::datalink::MacAddr;
use pnet::packet::ethernet::{EtherType, EtherTypes, MutableEthernetPacket};

use crate::frame::DecodeError;
use crate::{ETH_HDR_LEN, VLAN_TAG_LEN};

/// EtherType values up to this are an IEEE 802.3 payload length instead.
pub const MAX_802_3_LENGTH: u16 = 0x05dc;

pub fn make_header(buffer: &mut [u8], src_mac: MacAddr, dst_mac: MacAddr, et: EtherType) -> anyhow::Result<()> {
    let mut eth = MutableEthernetPacket::new(buffer).context("buffer too small for an ethernet header")?;
    eth.set_source(src_mac);
    eth.set_destination(dst_mac);
    eth.set_ethertype(et);
    Ok(())
}

/// 802.1Q tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanTag {
    /// Tag protocol identifier, `0x8100`.
    pub tpid: u16,
    /// Priority code point.
    pub pcp: u8,
    /// Drop eligible indicator.
    pub dei: bool,
    /// VLAN identifier.
    pub vid: u16,
}

impl VlanTag {
    pub fn from_tci(tpid: u16, tci: u16) -> Self {
        Self {
            tpid,
            pcp: (tci >> 13) as u8,
            dei: (tci >> 12) & 0x01 != 0,
            vid: tci & 0x0fff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    pub destination: HardwareAddr,
    pub source: HardwareAddr,
    pub vlan: Option<VlanTag>,
    /// EtherType of the payload, read after the VLAN tag if there is one.
    pub ethertype: u16,
}

impl EthernetHeader {
    pub fn header_len(&self) -> usize {
        match self.vlan {
            Some(_) => ETH_HDR_LEN + VLAN_TAG_LEN,
            None => ETH_HDR_LEN,
        }
    }

    pub fn is_length_field(&self) -> bool {
        self.ethertype <= MAX_802_3_LENGTH
    }

    /// Splits `data` into the header and the remaining payload.
    pub fn decode(data: &[u8]) -> Result<(EthernetHeader, &[u8]), DecodeError> {
        DecodeError::ensure_len("ethernet", data, ETH_HDR_LEN)?;

        let destination = mac_at(data, 0);
        let source = mac_at(data, 6);
        let mut ethertype = u16_at(data, 12);
        let mut vlan = None;

        if ethertype == EtherTypes::Vlan.0 {
            DecodeError::ensure_len("802.1Q", data, ETH_HDR_LEN + VLAN_TAG_LEN)?;
            vlan = Some(VlanTag::from_tci(ethertype, u16_at(data, 14)));
            ethertype = u16_at(data, 16);
        }

        let header = EthernetHeader { destination, source, vlan, ethertype };
        Ok((header, &data[header.header_len()..]))
    }
}

fn mac_at(data: &[u8], offset: usize) -> HardwareAddr {
    let mut octets = [0u8; 6];
    octets.copy_from_slice(&data[offset..offset + 6]);
    HardwareAddr::new(octets)
}

pub(crate) fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([data[offset], data[offset + 1]])
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
    use pnet::packet::ethernet::EthernetPacket;

    #[test]
    fn ethernet_header_sets_fields() {
        let mut b = [0u8; ETH_HDR_LEN];
        let src = MacAddr::new(0x00, 0x11, 0x22, 0x33, 0x44, 0x55);
        let dst = MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff);

        make_header(&mut b, src, dst, EtherTypes::Ipv4).unwrap();

        let eth = EthernetPacket::new(&b).expect("parse eth");
        assert_eq!(eth.get_source(), src);
        assert_eq!(eth.get_destination(), dst);
        assert_eq!(eth.get_ethertype(), EtherTypes::Ipv4);
    }

    #[test]
    fn ethernet_header_errors_when_buffer_too_small() {
        let mut tiny: [u8; 0] = [];
        assert!(make_header(&mut tiny, MacAddr::zero(), MacAddr::zero(), EtherTypes::Arp).is_err());
    }

    #[test]
    fn decodes_untagged_frame() {
        let mut frame = vec![0u8; 20];
        make_header(&mut frame, MacAddr::new(1, 2, 3, 4, 5, 6), MacAddr::broadcast(), EtherTypes::Arp).unwrap();

        let (header, payload) = EthernetHeader::decode(&frame).unwrap();
        assert_eq!(header.destination, HardwareAddr::BROADCAST);
        assert_eq!(header.source.to_string(), "01:02:03:04:05:06");
        assert_eq!(header.vlan, None);
        assert_eq!(header.ethertype, EtherTypes::Arp.0);
        assert_eq!(header.header_len(), ETH_HDR_LEN);
        assert_eq!(payload.len(), 6);
    }

    #[test]
    fn decodes_vlan_tag_and_shifts_ethertype() {
        let mut frame = vec![0u8; 22];
        make_header(&mut frame, MacAddr::zero(), MacAddr::broadcast(), EtherTypes::Vlan).unwrap();
        // PCP 5, DEI 1, VID 0x123
        frame[14..16].copy_from_slice(&0xb123u16.to_be_bytes());
        frame[16..18].copy_from_slice(&EtherTypes::Ipv4.0.to_be_bytes());

        let (header, payload) = EthernetHeader::decode(&frame).unwrap();
        let vlan = header.vlan.unwrap();
        assert_eq!(vlan.tpid, 0x8100);
        assert_eq!(vlan.pcp, 5);
        assert!(vlan.dei);
        assert_eq!(vlan.vid, 0x123);
        assert_eq!(header.ethertype, EtherTypes::Ipv4.0);
        assert_eq!(header.header_len(), 18);
        assert_eq!(payload.len(), 4);
    }

    #[test]
    fn rejects_truncated_frames() {
        assert!(matches!(EthernetHeader::decode(&[0u8; 13]), Err(DecodeError::Truncated { .. })));

        let mut frame = vec![0u8; 16];
        frame[12..14].copy_from_slice(&0x8100u16.to_be_bytes());
        assert!(matches!(EthernetHeader::decode(&frame), Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn small_ethertype_is_a_length() {
        let mut frame = vec![0u8; 14];
        frame[12..14].copy_from_slice(&0x0040u16.to_be_bytes());
        let (header, _) = EthernetHeader::decode(&frame).unwrap();
        assert!(header.is_length_field());
    }
}
