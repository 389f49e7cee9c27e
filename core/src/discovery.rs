//! # Network Discovery Service
//!
//! Implements the "scan one range expression" use case.
//!
//! This service turns the user's text into targets, runs them through the scan engine
//! and reports everything to a [`ScanObserver`]. It never aborts the process: a bad
//! expression only ends its own scan.

use arpscout_common::config::Config;
use arpscout_common::network::host::ScanResult;
use arpscout_common::network::range::{self, ResolvedRange};
use arpscout_common::network::target::RangeExpr;
use tracing::{debug, error};

use crate::probe::HostDiscovery;
use crate::scanner::{ScanEngine, ScanSummary};
use crate::vendors::VendorLookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Completed,
    /// The expression could not be parsed or expanded.
    InvalidInput,
    /// The expression was valid but named no host.
    EmptyRange,
}

impl ScanStatus {
    pub fn is_success(self) -> bool {
        self == ScanStatus::Completed
    }
}

/// Receives the progress of one scan.
pub trait ScanObserver {
    fn range_resolved(&mut self, _range: &ResolvedRange) {}

    /// Called once per target, in completion order.
    fn host(&mut self, result: &ScanResult);

    fn finished(&mut self, _summary: &ScanSummary) {}
}

/// Application Service for Network Discovery.
///
/// Orchestrates a scan by:
/// 1. resolving the range expression into targets.
/// 2. delegating probing and vendor lookups to the [`ScanEngine`].
pub struct DiscoveryService<'a> {
    probe: &'a dyn HostDiscovery,
    vendors: &'a dyn VendorLookup,
    max_workers: usize,
}

impl<'a> DiscoveryService<'a> {
    pub fn new(probe: &'a dyn HostDiscovery, vendors: &'a dyn VendorLookup, config: &Config) -> Self {
        Self { probe, vendors, max_workers: config.max_workers }
    }

    /// Scans everything `expression` names. Returns once all workers are joined.
    pub fn scan(&self, expression: &str, observer: &mut dyn ScanObserver) -> ScanStatus {
        let range = match expression.parse::<RangeExpr>().and_then(|expr| range::resolve(&expr)) {
            Ok(range) => range,
            Err(e) => {
                error!("{expression}: {e}");
                return ScanStatus::InvalidInput;
            }
        };

        if range.is_empty() {
            error!("{expression}: empty IP address range");
            return ScanStatus::EmptyRange;
        }

        debug!(%expression, targets = range.len(), mask = %range.mask, "range resolved");
        observer.range_resolved(&range);

        let engine = ScanEngine::new(self.probe, self.vendors, self.max_workers);
        let summary = engine.run(range.targets, |result| observer.host(&result));
        observer.finished(&summary);

        ScanStatus::Completed
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
