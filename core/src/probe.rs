//! # Host Discovery
//!
//! A probe answers one question for one address: is there a host, and what is its MAC.
//!
//! Two implementations exist:
//! * [`neighbour::NeighbourTableProbe`] lets the kernel resolve the address and reads
//!   its neighbour table. Works without privileges.
//! * [`raw::RawArpProbe`] sends its own ARP request on a link-layer channel. Needs root.
//!
//! Probes never fail. Anything that goes wrong is logged and reported as "not found" so
//! that every scanned address still yields exactly one result.

use std::time::Duration;

use arpscout_common::config::{Config, ProbeMethod};
use arpscout_common::network::addr::Addr4;
use arpscout_common::network::mac::HardwareAddr;
use is_root::is_root;
use tracing::debug;

pub mod neighbour;
pub mod raw;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub found: bool,
    pub mac: HardwareAddr,
    pub duration: Duration,
}

impl ProbeOutcome {
    pub fn found(mac: HardwareAddr, duration: Duration) -> Self {
        Self { found: true, mac, duration }
    }

    pub fn not_found(duration: Duration) -> Self {
        Self { found: false, mac: HardwareAddr::NULL, duration }
    }
}

pub trait HostDiscovery: Send + Sync {
    /// Blocks for at most the probe's time bound.
    fn probe(&self, target: Addr4) -> ProbeOutcome;
}

/// Picks the probe implementation for `config`.
pub fn select(config: &Config) -> Box<dyn HostDiscovery> {
    let method = match config.probe_method {
        ProbeMethod::Auto if is_root() => ProbeMethod::Raw,
        ProbeMethod::Auto => ProbeMethod::Table,
        method => method,
    };
    debug!(%method, timeout_ms = config.probe_timeout.as_millis() as u64, "selected probe");

    match method {
        ProbeMethod::Raw => Box::new(raw::RawArpProbe::new(config.probe_timeout)),
        _ => Box::new(neighbour::NeighbourTableProbe::new(config.probe_timeout)),
    }
}
