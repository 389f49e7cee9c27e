//! Host discovery through the operating system's neighbour (ARP) table.
//!
//! A datagram to the discard port makes the kernel resolve the target; the answer then
//! shows up in the neighbour table, which is polled until the time bound runs out.

use std::io;
use std::net::{Ipv4Addr, UdpSocket};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use arpscout_common::network::addr::Addr4;
use arpscout_common::network::interface::find_local_link;
use arpscout_common::network::mac::HardwareAddr;
use pnet::datalink::{self, NetworkInterface};
use tracing::{debug, trace, warn};

use super::{HostDiscovery, ProbeOutcome};

pub const PROC_NET_ARP: &str = "/proc/net/arp";

const DISCARD_PORT: u16 = 9;
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// `ATF_COM`: the entry holds a resolved hardware address.
const ATF_COM: u32 = 0x02;

/// Reads single entries from the kernel neighbour table.
#[derive(Debug, Clone)]
pub struct NeighbourTable {
    path: PathBuf,
}

impl NeighbourTable {
    pub fn new() -> Self {
        Self { path: PathBuf::from(PROC_NET_ARP) }
    }

    /// Table in `/proc/net/arp` format at `path`. Only used on Linux.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(target_os = "linux")]
    pub fn lookup(&self, target: Addr4) -> Option<HardwareAddr> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => parse_proc_net_arp(&content, target),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "failed to read neighbour table");
                None
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn lookup(&self, target: Addr4) -> Option<HardwareAddr> {
        let output = std::process::Command::new("arp")
            .arg("-n")
            .arg(target.to_string())
            .output();
        match output {
            Ok(out) => parse_arp_command(&String::from_utf8_lossy(&out.stdout), target),
            Err(e) => {
                debug!(error = %e, "failed to run arp");
                None
            }
        }
    }
}

impl Default for NeighbourTable {
    fn default() -> Self {
        Self::new()
    }
}

type Nudge = Box<dyn Fn(Addr4) -> io::Result<()> + Send + Sync>;

pub struct NeighbourTableProbe {
    timeout: Duration,
    table: NeighbourTable,
    interfaces: Vec<NetworkInterface>,
    nudge: Nudge,
}

impl NeighbourTableProbe {
    pub fn new(timeout: Duration) -> Self {
        Self::with_parts(timeout, NeighbourTable::new(), datalink::interfaces())
    }

    pub fn with_parts(timeout: Duration, table: NeighbourTable, interfaces: Vec<NetworkInterface>) -> Self {
        Self { timeout, table, interfaces, nudge: Box::new(trigger_resolution) }
    }

    /// Replaces the datagram that makes the kernel resolve a target.
    pub fn with_nudge(mut self, nudge: impl Fn(Addr4) -> io::Result<()> + Send + Sync + 'static) -> Self {
        self.nudge = Box::new(nudge);
        self
    }
}

impl HostDiscovery for NeighbourTableProbe {
    fn probe(&self, target: Addr4) -> ProbeOutcome {
        let start = Instant::now();

        if find_local_link(target, &self.interfaces).is_none() {
            debug!(%target, "target is not on a local link");
            return ProbeOutcome::not_found(start.elapsed());
        }

        // an entry read before this may be stale
        if let Err(e) = (self.nudge)(target) {
            match e.kind() {
                io::ErrorKind::NetworkUnreachable | io::ErrorKind::HostUnreachable => {
                    trace!(%target, error = %e, "unreachable");
                }
                _ => warn!(%target, error = %e, "failed to trigger address resolution"),
            }
            return ProbeOutcome::not_found(start.elapsed());
        }

        let deadline = start + self.timeout;
        loop {
            if let Some(mac) = self.table.lookup(target) {
                return ProbeOutcome::found(mac, start.elapsed());
            }
            let now = Instant::now();
            if now >= deadline {
                return ProbeOutcome::not_found(start.elapsed());
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

fn trigger_resolution(target: Addr4) -> io::Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.send_to(&[0], (Ipv4Addr::from(target), DISCARD_PORT))?;
    Ok(())
}

/// Finds the complete entry for `target` in `/proc/net/arp` content.
///
/// ```text
/// IP address       HW type     Flags       HW address            Mask     Device
/// 192.168.1.1      0x1         0x2         aa:bb:cc:dd:ee:ff     *        eth0
/// ```
pub fn parse_proc_net_arp(content: &str, target: Addr4) -> Option<HardwareAddr> {
    content.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[0].parse::<Addr4>().ok()? != target {
            return None;
        }

        let flags = u32::from_str_radix(fields[2].trim_start_matches("0x"), 16).ok()?;
        if flags & ATF_COM == 0 {
            return None;
        }

        fields[3].parse::<HardwareAddr>().ok().filter(|mac| !mac.is_null())
    })
}

/// Finds the hardware address in the output of `arp -n <target>`.
///
/// BSD and macOS print `? (10.0.0.1) at 0:1a:2b:3c:4d:5e on en0 ifscope [ethernet]`,
/// dropping leading zeros of each octet.
pub fn parse_arp_command(output: &str, target: Addr4) -> Option<HardwareAddr> {
    let needle = format!("({target})");
    output
        .lines()
        .filter(|line| line.contains(&needle))
        .find_map(|line| {
            let mut words = line.split_whitespace();
            words.find(|w| *w == "at")?;
            parse_loose_mac(words.next()?)
        })
}

fn parse_loose_mac(s: &str) -> Option<HardwareAddr> {
    let octets: Vec<u8> = s
        .split(':')
        .map(|o| u8::from_str_radix(o, 16).ok())
        .collect::<Option<_>>()?;
    let octets: [u8; 6] = octets.try_into().ok()?;
    Some(HardwareAddr::new(octets)).filter(|mac| !mac.is_null())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
