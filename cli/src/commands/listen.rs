use anyhow::{Context, anyhow};
use arpscout_core::probe::raw::open_eth_channel;
use arpscout_protocols::frame::{self, Network, Transport, ethertype_name, ip_protocol_name};
use colored::*;
use pnet::datalink::{self, Config, NetworkInterface};
use tracing::{debug, info};

use crate::terminal::{colors, hexdump::hexdump, print};

/// Prints every frame seen on the interface until `count` frames were shown.
pub fn listen(interface: Option<&str>, count: Option<usize>) -> anyhow::Result<()> {
    let intf = select_interface(interface, datalink::interfaces())?;
    let (_tx, mut rx) = open_eth_channel(&intf, Config::default(), datalink::channel)?;
    info!("listening on {}", intf.name);

    let mut seen = 0usize;
    while count.is_none_or(|n| seen < n) {
        let data = match rx.next() {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "receive failed");
                continue;
            }
        };
        seen += 1;

        print::header(&format!("frame {seen}, {} bytes", data.len()));
        for line in describe_frame(data) {
            print::print(&line);
        }
        for row in hexdump(data) {
            print::print(&row.color(colors::SEPARATOR).to_string());
        }
    }
    Ok(())
}

fn select_interface(name: Option<&str>, interfaces: Vec<NetworkInterface>) -> anyhow::Result<NetworkInterface> {
    match name {
        Some(name) => interfaces
            .into_iter()
            .find(|i| i.name == name)
            .with_context(|| format!("no interface named {name}")),
        None => interfaces
            .into_iter()
            .find(|i| i.is_up() && !i.is_loopback() && i.mac.is_some())
            .ok_or_else(|| anyhow!("no usable interface found")),
    }
}

fn checksum_state(ok: bool) -> ColoredString {
    if ok { "ok".color(colors::PRIMARY) } else { "bad".color(colors::CHECKSUM_BAD) }
}

/// One line per decoded layer.
pub fn describe_frame(data: &[u8]) -> Vec<String> {
    let decoded = match frame::decode_frame(data) {
        Ok(decoded) => decoded,
        Err(e) => return vec![format!("undecodable frame: {e}")],
    };

    let eth = &decoded.ethernet;
    let mut lines = Vec::new();
    let kind = if eth.is_length_field() {
        format!("802.3 length {}", eth.ethertype)
    } else {
        format!("{} (0x{:04x})", ethertype_name(eth.ethertype), eth.ethertype)
    };
    lines.push(format!("eth   {} > {}  {kind}", eth.source, eth.destination));
    if let Some(tag) = eth.vlan {
        lines.push(format!("vlan  id {} pcp {}{}", tag.vid, tag.pcp, if tag.dei { " dei" } else { "" }));
    }

    match &decoded.network {
        Network::Arp(msg, _) => match msg.addrs {
            Some(a) => lines.push(format!(
                "arp   {} {} ({}) > {} ({})",
                msg.operation_name(),
                a.sender_ip,
                a.sender_mac,
                a.target_ip,
                a.target_mac
            )),
            None => lines.push(format!(
                "arp   op {} hw 0x{:04x} proto 0x{:04x}",
                msg.header.operation, msg.header.hw_type, msg.header.proto_type
            )),
        },
        Network::Ipv4(ip, transport) => {
            lines.push(format!(
                "ipv4  {} > {}  {} ttl {} len {} checksum 0x{:04x} {}",
                ip.source,
                ip.destination,
                ip_protocol_name(ip.protocol),
                ip.ttl,
                ip.total_len,
                ip.checksum,
                checksum_state(ip.checksum_ok())
            ));
            lines.extend(describe_transport(transport));
        }
        Network::Other(payload) => lines.push(format!("data  {} bytes", payload.len())),
    }
    lines
}

fn describe_transport(transport: &Transport<'_>) -> Option<String> {
    match transport {
        Transport::Tcp(h, data) => Some(format!(
            "tcp   {} > {} seq {} header {}B flags 0x{:02x} data {}B",
            h.src_port,
            h.dst_port,
            h.sequence,
            h.header_len(),
            h.flags,
            data.len()
        )),
        Transport::Udp(h, data, _) => Some(format!(
            "udp   {} > {} len {} checksum 0x{:04x} data {}B",
            h.src_port,
            h.dst_port,
            h.length,
            h.checksum,
            data.len()
        )),
        Transport::Icmp(h, _) => Some(format!(
            "icmp  type {} code {} checksum 0x{:04x} {}",
            h.icmp_type,
            h.code,
            h.checksum,
            checksum_state(h.checksum_ok())
        )),
        Transport::Malformed(e, _) => Some(format!("      {e}")),
        Transport::Other(_) => None,
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
    use arpscout_common::network::addr::Addr4;
    use arpscout_common::network::mac::HardwareAddr;
    use arpscout_protocols::arp;
    use pnet::datalink::dummy;

    #[test]
    fn describes_arp_request() {
        colored::control::set_override(false);
        let src = HardwareAddr::new([0x02, 0, 0, 0, 0, 1]);
        let request = arp::create_request(src, Addr4::new(192, 168, 1, 10), Addr4::new(192, 168, 1, 1)).unwrap();

        let lines = describe_frame(&request);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "eth   02:00:00:00:00:01 > FF:FF:FF:FF:FF:FF  ARP (0x0806)");
        assert_eq!(lines[1], "arp   request 192.168.1.10 (02:00:00:00:00:01) > 192.168.1.1 (00:00:00:00:00:00)");
    }

    #[test]
    fn truncated_frame_is_reported() {
        let lines = describe_frame(&[0u8; 10]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("undecodable frame"));
    }

    #[test]
    fn interface_selection() {
        let interfaces = vec![dummy::dummy_interface(0), dummy::dummy_interface(1)];
        assert_eq!(select_interface(Some("eth1"), interfaces.clone()).unwrap().name, "eth1");
        assert!(select_interface(Some("wlan9"), interfaces).is_err());
    }
}
