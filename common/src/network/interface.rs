//! # Local Links
//!
//! Finds the local interface a target is directly reachable on. ARP only works on-link,
//! so a target that no interface network contains cannot be probed at all.

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::network::addr::{Addr4, SubnetMask4};
use crate::network::mac::HardwareAddr;

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }
}

/// The local end of a link: which interface, and the address and MAC we send from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLink {
    pub interface: NetworkInterface,
    pub mac: HardwareAddr,
    pub addr: Addr4,
    pub mask: SubnetMask4,
}

impl LocalLink {
    pub fn name(&self) -> &str {
        &self.interface.name
    }

    pub fn contains(&self, target: Addr4) -> bool {
        (self.addr ^ target) & self.mask == Addr4::NULL
    }
}

/// Returns the first interface whose IPv4 network contains `target`.
///
/// Interfaces that are down, loopback, or lack a MAC address are skipped.
pub fn find_local_link(target: Addr4, interfaces: &[NetworkInterface]) -> Option<LocalLink> {
    interfaces
        .iter()
        .filter(|intf| intf.is_up() && !intf.is_loopback())
        .find_map(|intf| {
            let mac = intf.mac.map(HardwareAddr::from).filter(|m| !m.is_null())?;
            intf.get_ipv4_nets().into_iter().find_map(|net| {
                let mask = SubnetMask4::from_value(u32::from(net.mask())).ok()?;
                let link = LocalLink {
                    interface: intf.clone(),
                    mac,
                    addr: Addr4::from(net.ip()),
                    mask,
                };
                link.contains(target).then_some(link)
            })
        })
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
    use pnet::ipnetwork::Ipv6Network;
    use pnet::util::MacAddr;
    use std::net::{Ipv4Addr, Ipv6Addr};

    const IFF_UP: u32 = 1;
    const IFF_BROADCAST: u32 = 1 << 1;
    const IFF_LOOPBACK: u32 = 1 << 3;

    fn ni(name: &str, mac: Option<MacAddr>, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
        NetworkInterface {
            name: name.into(),
            description: "".into(),
            index: 0,
            mac,
            ips: ips.to_vec(),
            flags,
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
        IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
    }

    fn v6(s: &str, p: u8) -> IpNetwork {
        IpNetwork::V6(Ipv6Network::new(s.parse::<Ipv6Addr>().unwrap(), p).unwrap())
    }

    fn lo() -> NetworkInterface {
        ni("lo", Some(MacAddr::zero()), &[v4(127, 0, 0, 1, 8), v6("::1", 128)], IFF_UP | IFF_LOOPBACK)
    }

    fn enp9s0() -> NetworkInterface {
        ni(
            "enp9s0",
            Some(MacAddr::new(0xa8, 0xa1, 0x59, 0x13, 0x41, 0x46)),
            &[v6("fe80::b3dd:5c39:7c29:48b6", 64), v4(192, 168, 0, 32, 24)],
            IFF_UP | IFF_BROADCAST,
        )
    }

    fn wlan0_down() -> NetworkInterface {
        ni(
            "wlan0",
            Some(MacAddr::new(0x10, 0x20, 0x30, 0x40, 0x50, 0x60)),
            &[v4(10, 0, 0, 5, 16)],
            IFF_BROADCAST,
        )
    }

    fn tun0() -> NetworkInterface {
        ni("tun0", None, &[v4(10, 8, 0, 2, 24)], IFF_UP)
    }

    #[test]
    fn selects_interface_containing_target() {
        let interfaces = vec![lo(), tun0(), enp9s0()];
        let link = find_local_link(Addr4::new(192, 168, 0, 77), &interfaces).unwrap();

        assert_eq!(link.name(), "enp9s0");
        assert_eq!(link.addr, Addr4::new(192, 168, 0, 32));
        assert_eq!(link.mask.prefix_size(), 24);
        assert_eq!(link.mac.to_string(), "A8:A1:59:13:41:46");
    }

    #[test]
    fn off_link_target_has_no_link() {
        let interfaces = vec![lo(), enp9s0()];
        assert!(find_local_link(Addr4::new(192, 168, 1, 77), &interfaces).is_none());
        assert!(find_local_link(Addr4::new(8, 8, 8, 8), &interfaces).is_none());
    }

    #[test]
    fn skips_loopback_down_and_macless_interfaces() {
        let interfaces = vec![lo(), wlan0_down(), tun0()];
        assert!(find_local_link(Addr4::new(127, 0, 0, 1), &interfaces).is_none());
        assert!(find_local_link(Addr4::new(10, 0, 1, 1), &interfaces).is_none());
        assert!(find_local_link(Addr4::new(10, 8, 0, 1), &interfaces).is_none());
    }

    #[test]
    fn ipv4_nets_ignores_v6() {
        let nets = enp9s0().get_ipv4_nets();
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].prefix(), 24);
    }
}
