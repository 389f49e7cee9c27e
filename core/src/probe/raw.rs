//! Host discovery with hand-built ARP requests on a link-layer channel.
//!
//! This scanner requires **root privileges** to open raw Layer 2 channels.

use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use arpscout_common::network::addr::Addr4;
use arpscout_common::network::interface::{LocalLink, find_local_link};
use arpscout_common::network::mac::HardwareAddr;
use arpscout_protocols::arp;
use pnet::datalink::{self, Channel, Config, DataLinkReceiver, DataLinkSender, NetworkInterface};
use tracing::{debug, warn};

use super::{HostDiscovery, ProbeOutcome};

const READ_TIMEOUT: Duration = Duration::from_millis(50);

pub struct RawArpProbe {
    timeout: Duration,
    interfaces: Vec<NetworkInterface>,
}

impl RawArpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self::with_interfaces(timeout, datalink::interfaces())
    }

    pub fn with_interfaces(timeout: Duration, interfaces: Vec<NetworkInterface>) -> Self {
        Self { timeout, interfaces }
    }
}

impl HostDiscovery for RawArpProbe {
    fn probe(&self, target: Addr4) -> ProbeOutcome {
        let start = Instant::now();

        let Some(link) = find_local_link(target, &self.interfaces) else {
            debug!(%target, "target is not on a local link");
            return ProbeOutcome::not_found(start.elapsed());
        };

        match probe_link(&link, target, self.timeout, datalink::channel) {
            Ok(Some(mac)) => ProbeOutcome::found(mac, start.elapsed()),
            Ok(None) => ProbeOutcome::not_found(start.elapsed()),
            Err(e) => {
                warn!(%target, interface = link.name(), "ARP probe failed: {e:#}");
                ProbeOutcome::not_found(start.elapsed())
            }
        }
    }
}

/// Sends one ARP request for `target` out of `link` and waits up to `timeout` for the reply.
pub fn probe_link<F>(link: &LocalLink, target: Addr4, timeout: Duration, channel_opener: F)
    -> anyhow::Result<Option<HardwareAddr>>
where F: FnOnce(&NetworkInterface, Config) -> std::io::Result<Channel>
{
    let (mut tx, mut rx) = open_eth_channel(&link.interface, channel_config(), channel_opener)?;
    let deadline = Instant::now() + timeout;

    let request = arp::create_request(link.mac, link.addr, target)?;
    if let Some(Err(e)) = tx.send_to(&request, None) {
        return Err(e).with_context(|| format!("sending ARP request on {}", link.name()));
    }

    Ok(await_reply(rx.as_mut(), link.addr, target, deadline))
}

fn await_reply(rx: &mut dyn DataLinkReceiver, local_addr: Addr4, target: Addr4, deadline: Instant)
    -> Option<HardwareAddr> {
    while Instant::now() < deadline {
        // read errors are the channel's read timeout
        if let Ok(frame) = rx.next() {
            if let Some(mac) = arp::parse_reply(frame, local_addr, target) {
                return Some(mac);
            }
        }
    }
    None
}

/// Opens `intf` through `opener` and insists on an Ethernet channel.
pub fn open_eth_channel<F>(intf: &NetworkInterface, config: Config, opener: F)
    -> anyhow::Result<(Box<dyn DataLinkSender>, Box<dyn DataLinkReceiver>)>
where F: FnOnce(&NetworkInterface, Config) -> std::io::Result<Channel>
{
    match opener(intf, config).with_context(|| format!("link-layer channel on {}", intf.name))? {
        Channel::Ethernet(tx, rx) => Ok((tx, rx)),
        _ => bail!("{} does not carry Ethernet frames", intf.name),
    }
}

fn channel_config() -> Config {
    Config {
        read_timeout: Some(READ_TIMEOUT),
        ..Default::default()
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
