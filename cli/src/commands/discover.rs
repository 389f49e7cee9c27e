use std::process::ExitCode;

use anyhow::bail;
use arpscout_common::config::{Config, VendorMode};
use arpscout_common::network::host::ScanResult;
use arpscout_common::network::range::ResolvedRange;
use arpscout_core::discovery::{DiscoveryService, ScanObserver};
use arpscout_core::network::http::{HttpQueue, RequestQueue};
use arpscout_core::probe;
use arpscout_core::scanner::ScanSummary;
use arpscout_core::vendors::VendorResolver;
use arpscout_core::vendors::cache::{self, VendorCache};
use tracing::{debug, trace, warn};

use crate::commands::ScanArgs;
use crate::terminal::print;

/// Renders scan progress as it happens.
struct TerminalObserver {
    show_source: bool,
}

impl ScanObserver for TerminalObserver {
    fn range_resolved(&mut self, range: &ResolvedRange) {
        print::range_statistics(range);
    }

    fn host(&mut self, result: &ScanResult) {
        if result.found {
            print::host(result, self.show_source);
        } else {
            trace!(ip = %result.ip, "no answer");
        }
    }

    fn finished(&mut self, summary: &ScanSummary) {
        print::summary(summary);
    }
}

/// Scans every target expression in turn. Fails the run if any of them failed.
pub fn discover(args: &ScanArgs) -> anyhow::Result<ExitCode> {
    if args.targets.is_empty() {
        bail!("no target given, see --help");
    }

    let cfg: Config = args.to_config();

    let cache = match cfg.vendor_mode {
        VendorMode::Disabled => VendorCache::in_memory(),
        _ => VendorCache::load(cfg.cache_path.clone().unwrap_or_else(cache::default_path)),
    };

    let queue = match cfg.vendor_mode {
        VendorMode::Online => HttpQueue::start()
            .map_err(|e| warn!("online vendor lookup unavailable: {e}"))
            .ok(),
        _ => None,
    };

    let all_completed = {
        let resolver = VendorResolver::new(
            cfg.vendor_mode,
            &cache,
            queue.as_ref().map(|q| q as &dyn RequestQueue),
            cfg.api_url.clone(),
        );
        let prober = probe::select(&cfg);
        let service = DiscoveryService::new(prober.as_ref(), &resolver, &cfg);
        let mut observer = TerminalObserver { show_source: cfg.show_source };

        args.targets
            .iter()
            .map(|target| service.scan(target, &mut observer))
            .fold(true, |ok, status| status.is_success() && ok)
    };

    // every worker is joined at this point
    drop(queue);
    save_cache(&cache);

    Ok(if all_completed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn save_cache(cache: &VendorCache) {
    let path = cache.path().map(|p| p.display().to_string()).unwrap_or_default();
    match cache.save() {
        Ok(true) => debug!(%path, "vendor cache written"),
        Ok(false) => {}
        Err(e) => warn!("failed to write cache file \"{path}\": {e}"),
    }
}
