use anyhow::Context;
use arpscout_common::network::addr::Addr4;
use arpscout_common::network::mac::HardwareAddr;
use pnet::datalink::MacAddr;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::EtherTypes;

use crate::ethernet::{self, EthernetHeader};
use crate::frame::DecodeError;
use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS};

pub const OPERATION_REQUEST: u16 = 1;
pub const OPERATION_REPLY: u16 = 2;

/// Builds a broadcast "who has `dst_addr`" frame, zero padded to the ethernet minimum.
pub fn create_request(src_mac: HardwareAddr, src_addr: Addr4, dst_addr: Addr4) -> anyhow::Result<Vec<u8>> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, src_mac.into(), MacAddr::broadcast(), EtherTypes::Arp)?;
    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .context("failed to create mutable ARP packet")?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Request);
    arp_packet.set_sender_hw_addr(src_mac.into());
    arp_packet.set_target_hw_addr(MacAddr::zero());
    arp_packet.set_sender_proto_addr(src_addr.into());
    arp_packet.set_target_proto_addr(dst_addr.into());
    Ok(Vec::from(buffer))
}

/// Fixed part of an ARP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpHeader {
    pub hw_type: u16,
    pub proto_type: u16,
    pub hw_len: u8,
    pub proto_len: u8,
    pub operation: u16,
}

/// Addresses of an Ethernet/IPv4 ARP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpAddrs {
    pub sender_mac: HardwareAddr,
    pub sender_ip: Addr4,
    pub target_mac: HardwareAddr,
    pub target_ip: Addr4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpMessage {
    pub header: ArpHeader,
    /// Only present for Ethernet/IPv4 messages.
    pub addrs: Option<ArpAddrs>,
    /// Length of the header plus the address fields it announces.
    pub len: usize,
}

impl ArpMessage {
    pub const HEADER_LEN: usize = 8;

    pub fn operation_name(&self) -> &'static str {
        match self.header.operation {
            OPERATION_REQUEST => "request",
            OPERATION_REPLY => "reply",
            _ => "",
        }
    }

    pub fn decode(payload: &[u8]) -> Result<ArpMessage, DecodeError> {
        DecodeError::ensure_len("arp", payload, Self::HEADER_LEN)?;
        let header = ArpHeader {
            hw_type: ethernet::u16_at(payload, 0),
            proto_type: ethernet::u16_at(payload, 2),
            hw_len: payload[4],
            proto_len: payload[5],
            operation: ethernet::u16_at(payload, 6),
        };
        let len = Self::HEADER_LEN + 2 * usize::from(header.hw_len) + 2 * usize::from(header.proto_len);

        let is_ether_ipv4 = header.hw_type == ArpHardwareTypes::Ethernet.0
            && header.proto_type == EtherTypes::Ipv4.0
            && header.hw_len == 6
            && header.proto_len == 4;

        let addrs = if is_ether_ipv4 {
            let arp = ArpPacket::new(payload).ok_or(DecodeError::Truncated {
                layer: "arp",
                need: ARP_LEN,
                have: payload.len(),
            })?;
            Some(ArpAddrs {
                sender_mac: arp.get_sender_hw_addr().into(),
                sender_ip: arp.get_sender_proto_addr().into(),
                target_mac: arp.get_target_hw_addr().into(),
                target_ip: arp.get_target_proto_addr().into(),
            })
        } else {
            None
        };

        Ok(ArpMessage { header, addrs, len })
    }
}

/// Returns the hardware address of `target` if `frame` is its ARP reply to `local_addr`.
pub fn parse_reply(frame: &[u8], local_addr: Addr4, target: Addr4) -> Option<HardwareAddr> {
    let (eth, payload) = EthernetHeader::decode(frame).ok()?;
    if eth.ethertype != EtherTypes::Arp.0 {
        return None;
    }

    let message = ArpMessage::decode(payload).ok()?;
    let addrs = message.addrs?;
    let is_answer = message.header.operation == OPERATION_REPLY
        && addrs.sender_ip == target
        && addrs.target_ip == local_addr;

    is_answer.then_some(addrs.sender_mac)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
