//! # Frame Decoding
//!
//! Decodes a captured link-layer frame as far as the known protocols go:
//! Ethernet (with an optional 802.1Q tag), then ARP or IPv4, then TCP, UDP or ICMP.

use pnet::packet::ethernet::EtherTypes;
use pnet::packet::ip::IpNextHeaderProtocols;
use thiserror::Error;

use crate::arp::ArpMessage;
use crate::ethernet::EthernetHeader;
use crate::icmp::IcmpHeader;
use crate::ipv4::Ipv4Header;
use crate::tcp::TcpHeader;
use crate::udp::UdpHeader;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("truncated {layer} header: need {need} bytes, have {have}")]
    Truncated { layer: &'static str, need: usize, have: usize },

    #[error("unsupported header: {0}")]
    Unsupported(String),
}

impl DecodeError {
    pub(crate) fn ensure_len(layer: &'static str, data: &[u8], need: usize) -> Result<(), DecodeError> {
        if data.len() < need {
            return Err(DecodeError::Truncated { layer, need, have: data.len() });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport<'a> {
    Tcp(TcpHeader, &'a [u8]),
    /// Header, data, padding.
    Udp(UdpHeader, &'a [u8], &'a [u8]),
    Icmp(IcmpHeader, &'a [u8]),
    Other(&'a [u8]),
    /// The transport header could not be decoded.
    Malformed(DecodeError, &'a [u8]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Network<'a> {
    /// Message and trailing padding.
    Arp(ArpMessage, &'a [u8]),
    Ipv4(Ipv4Header, Transport<'a>),
    Other(&'a [u8]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    pub ethernet: EthernetHeader,
    pub network: Network<'a>,
}

/// Decodes `data`. Only a broken ethernet, ARP or IPv4 header is an error; unknown
/// payloads are returned raw.
pub fn decode_frame(data: &[u8]) -> Result<DecodedFrame<'_>, DecodeError> {
    let (ethernet, payload) = EthernetHeader::decode(data)?;

    let network = match ethernet.ethertype {
        t if t == EtherTypes::Arp.0 => {
            let message = ArpMessage::decode(payload)?;
            let padding = payload.get(message.len..).unwrap_or_default();
            Network::Arp(message, padding)
        }
        t if t == EtherTypes::Ipv4.0 => {
            let (header, ip_payload) = Ipv4Header::decode(payload)?;
            Network::Ipv4(header, decode_transport(header.protocol, ip_payload))
        }
        _ => Network::Other(payload),
    };

    Ok(DecodedFrame { ethernet, network })
}

fn decode_transport(protocol: u8, data: &[u8]) -> Transport<'_> {
    let decoded = match protocol {
        p if p == IpNextHeaderProtocols::Tcp.0 => TcpHeader::decode(data).map(|(h, d)| Transport::Tcp(h, d)),
        p if p == IpNextHeaderProtocols::Udp.0 => UdpHeader::decode(data).map(|(h, d, pad)| Transport::Udp(h, d, pad)),
        p if p == IpNextHeaderProtocols::Icmp.0 => IcmpHeader::decode(data).map(|(h, d)| Transport::Icmp(h, d)),
        _ => Ok(Transport::Other(data)),
    };
    decoded.unwrap_or_else(|e| Transport::Malformed(e, data))
}

pub fn ethertype_name(ethertype: u16) -> &'static str {
    match ethertype {
        0x0000..=0x05dc => "IEEE 802.3 length",
        0x0800 => "IPv4",
        0x0806 => "ARP",
        0x0842 => "Wake-on-LAN",
        0x22f0 => "AVTP",
        0x22f3 => "TRILL",
        0x8035 => "RARP",
        0x809b => "AppleTalk",
        0x8100 => "802.1Q",
        0x8137 => "IPX",
        0x86dd => "IPv6",
        0x8808 => "Ethernet flow control",
        0x8809 => "LACP",
        0x8847 => "MPLS unicast",
        0x8848 => "MPLS multicast",
        0x8863 => "PPPoE discovery",
        0x8864 => "PPPoE session",
        0x888e => "EAPoL",
        0x88a8 => "802.1ad",
        0x88cc => "LLDP",
        0x88e5 => "MACsec",
        0x88f7 => "PTP",
        0x8906 => "FCoE",
        _ => "",
    }
}

pub fn ip_protocol_name(protocol: u8) -> &'static str {
    match protocol {
        0 => "HOPOPT",
        1 => "ICMP",
        2 => "IGMP",
        4 => "IP-in-IP",
        6 => "TCP",
        17 => "UDP",
        41 => "IPv6",
        47 => "GRE",
        50 => "ESP",
        51 => "AH",
        58 => "IPv6-ICMP",
        89 => "OSPF",
        103 => "PIM",
        112 => "VRRP",
        132 => "SCTP",
        _ => "",
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
