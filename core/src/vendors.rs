//! # Vendor Resolution
//!
//! Cache first, then the lookup API. Successful online answers are written back to the
//! cache so the next run resolves them offline.

use arpscout_common::config::VendorMode;
use arpscout_common::network::mac::{AddrBlock, HardwareAddr};
use arpscout_common::vendors::Vendor;
use tracing::{debug, warn};

use crate::network::http::RequestQueue;

pub mod cache;
pub mod online;

use cache::{CacheError, VendorCache};

pub trait VendorLookup: Send + Sync {
    /// Never fails, an unknown vendor is an empty [`Vendor`].
    fn resolve(&self, mac: HardwareAddr) -> Vendor;
}

pub struct VendorResolver<'a> {
    mode: VendorMode,
    cache: &'a VendorCache,
    queue: Option<&'a dyn RequestQueue>,
    api_url: String,
}

impl<'a> VendorResolver<'a> {
    /// Without a `queue` the resolver works from the cache only.
    pub fn new(
        mode: VendorMode,
        cache: &'a VendorCache,
        queue: Option<&'a dyn RequestQueue>,
        api_url: impl Into<String>,
    ) -> Self {
        Self { mode, cache, queue, api_url: api_url.into() }
    }

    fn resolve_online(&self, queue: &dyn RequestQueue, mac: HardwareAddr) -> Vendor {
        let (block, vendor) = match online::lookup(queue, &self.api_url, mac) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("failed to lookup {mac} online: {e}");
                return Vendor::default();
            }
        };
        debug!(%mac, %block, name = %vendor.name, "online lookup");

        // locally administered addresses are not attributable to the block's owner
        let block = if mac.is_cid() { AddrBlock::Cid } else { block };
        match self.cache.add(block, mac, &vendor) {
            Ok(()) => {}
            Err(CacheError::NotCacheable(AddrBlock::Cid)) => warn!("can't add CID to cache"),
            Err(e) => warn!("failed to cache vendor of {mac}: {e}"),
        }
        vendor
    }
}

impl VendorLookup for VendorResolver<'_> {
    fn resolve(&self, mac: HardwareAddr) -> Vendor {
        if self.mode == VendorMode::Disabled {
            return Vendor::default();
        }

        let cached = self.cache.get(mac);
        if !cached.is_empty() {
            return cached;
        }

        match (self.mode, self.queue) {
            (VendorMode::Online, Some(queue)) => self.resolve_online(queue, mac),
            _ => Vendor::default(),
        }
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
