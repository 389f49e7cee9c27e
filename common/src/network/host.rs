//! # Scan Results

use std::time::Duration;

use crate::network::addr::Addr4;
use crate::network::mac::HardwareAddr;
use crate::vendors::Vendor;

/// Outcome of probing one target.
///
/// `found == false` is a completed probe that got no answer, not a pending one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub ip: Addr4,
    pub mac: HardwareAddr,
    pub duration: Duration,
    pub vendor: Vendor,
    pub found: bool,
}

impl ScanResult {
    pub fn found(ip: Addr4, mac: HardwareAddr, duration: Duration) -> Self {
        Self { ip, mac, duration, vendor: Vendor::default(), found: true }
    }

    pub fn not_found(ip: Addr4) -> Self {
        Self {
            ip,
            mac: HardwareAddr::NULL,
            duration: Duration::ZERO,
            vendor: Vendor::default(),
            found: false,
        }
    }

    pub fn with_vendor(mut self, vendor: Vendor) -> Self {
        self.vendor = vendor;
        self
    }

    pub fn millis(&self) -> u128 {
        self.duration.as_millis()
    }
}
