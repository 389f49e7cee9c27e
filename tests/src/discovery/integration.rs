use std::fs;

use arpscout_common::config::{Config, VendorMode};
use arpscout_common::network::mac::AddrBlock;
use arpscout_common::vendors::{Rgb, VendorSource};
use arpscout_core::discovery::{DiscoveryService, ScanStatus};
use arpscout_core::vendors::VendorResolver;
use arpscout_core::vendors::cache::VendorCache;
use tempfile::tempdir;

use crate::support::{CannedApi, Recorder, ScriptedNetwork};

const API: &str = "http://lookup.invalid";

const PI: &str = r#"[{"company":"Raspberry Pi Foundation","type":"MA-L"}]"#;
const LAB: &str = r#"[{"company":"Hach Lange GmbH","type":"MA-S"}]"#;
const PRIVATE: &str = r#"[{"company":"Private Fleet","type":"MA-L"}]"#;

fn office() -> ScriptedNetwork {
    ScriptedNetwork::new(&[
        ("192.168.1.1", "00:1B:2C:00:00:01"),
        ("192.168.1.10", "B8:27:EB:00:00:10"),
        ("192.168.1.11", "B8:27:EB:00:00:11"),
        ("192.168.1.50", "70:B3:D5:2A:10:50"),
        ("192.168.1.77", "0A:00:00:00:00:77"),
    ])
}

fn canned() -> CannedApi {
    CannedApi::new(vec![("B8:27:EB", PI), ("70:B3:D5:2A:1", LAB), ("0A:00:00", PRIVATE)])
}

fn config(workers: usize) -> Config {
    Config { max_workers: workers, ..Config::default() }
}

#[test]
fn online_scan_fills_and_persists_the_cache() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("nested").join("vendors.json");
    let network = office();
    let api = canned();

    let cache = VendorCache::load(&path);
    assert!(cache.is_empty());

    let mut recorder = Recorder::default();
    let status = {
        let resolver = VendorResolver::new(VendorMode::Online, &cache, Some(&api), API);
        let service = DiscoveryService::new(&network, &resolver, &config(16));
        service.scan("192.168.1.0", &mut recorder)
    };
    assert_eq!(status, ScanStatus::Completed);

    assert_eq!(recorder.results.len(), 254);
    assert_eq!(recorder.summaries.len(), 1);
    assert_eq!(recorder.summaries[0].scanned, 254);
    assert_eq!(recorder.summaries[0].found, 5);
    assert_eq!(recorder.found().len(), 5);

    let pi = recorder.result_for("192.168.1.10");
    assert_eq!(pi.vendor.name, "Raspberry Pi Foundation");
    assert_eq!(pi.vendor.colour, Some(Rgb(0xc5, 0x1a, 0x4a)));
    assert_eq!(recorder.result_for("192.168.1.11").vendor.name, "Raspberry Pi Foundation");
    assert_eq!(recorder.result_for("192.168.1.50").vendor.name, "Hach Lange GmbH");

    // unknown to the API, and a CID that resolves but is never stored
    assert!(recorder.result_for("192.168.1.1").vendor.is_empty());
    let cid = recorder.result_for("192.168.1.77");
    assert_eq!(cid.vendor.name, "Private Fleet");
    assert_eq!(cid.vendor.source, VendorSource::Api);

    // silent hosts never reach the lookup
    assert!(!recorder.result_for("192.168.1.2").found);
    assert!(api.calls() <= 5);

    assert!(cache.save()?);
    assert!(fs::read_to_string(&path)?.contains("\"Version\": \"1.0.0\""));

    let reloaded = VendorCache::load(&path);
    assert_eq!(reloaded.records(AddrBlock::Oui36).len(), 1);
    assert!(reloaded.records(AddrBlock::Oui28).is_empty());
    assert!(reloaded.records(AddrBlock::Oui).iter().all(|r| r.name == "Raspberry Pi Foundation"));
    assert!(!reloaded.is_dirty());
    Ok(())
}

#[test]
fn second_run_resolves_from_the_saved_cache() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("vendors.json");
    let network = office();

    {
        let api = canned();
        let cache = VendorCache::load(&path);
        let resolver = VendorResolver::new(VendorMode::Online, &cache, Some(&api), API);
        let service = DiscoveryService::new(&network, &resolver, &config(8));
        service.scan("192.168.1.1-80", &mut Recorder::default());
        cache.save()?;
    }

    let api = canned();
    let cache = VendorCache::load(&path);
    let mut recorder = Recorder::default();
    {
        let resolver = VendorResolver::new(VendorMode::CacheOnly, &cache, Some(&api), API);
        let service = DiscoveryService::new(&network, &resolver, &config(8));
        assert!(service.scan("192.168.1.1-80", &mut recorder).is_success());
    }

    assert_eq!(api.calls(), 0);
    let pi = recorder.result_for("192.168.1.11");
    assert_eq!(pi.vendor.name, "Raspberry Pi Foundation");
    assert_eq!(pi.vendor.source, VendorSource::Cache);
    assert_eq!(recorder.result_for("192.168.1.50").vendor.source, VendorSource::Cache);
    assert!(recorder.result_for("192.168.1.77").vendor.is_empty());

    assert!(!cache.save()?);
    Ok(())
}

#[test]
fn most_specific_cached_block_wins() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("vendors.json");
    fs::write(
        &path,
        r##"{
  "Version": "1.0.0",
  "MA-L": [ { "OUI": "001B2C", "Name": "Broad Corp", "Colour": "#000000" } ],
  "MA-M": [ { "OUI": "001B2C0", "Name": "Narrow Ltd", "Colour": "#112233" } ],
  "MA-S": []
}"##,
    )?;
    let network = ScriptedNetwork::new(&[
        ("10.0.0.2", "00:1B:2C:00:00:02"),
        ("10.0.0.3", "00:1B:2C:F0:00:03"),
    ]);

    let cache = VendorCache::load(&path);
    let mut recorder = Recorder::default();
    let resolver = VendorResolver::new(VendorMode::CacheOnly, &cache, None, API);
    let service = DiscoveryService::new(&network, &resolver, &config(4));
    assert!(service.scan("10.0.0.1-4", &mut recorder).is_success());

    let narrow = &recorder.result_for("10.0.0.2").vendor;
    assert_eq!(narrow.name, "Narrow Ltd");
    assert_eq!(narrow.colour, Some(Rgb(0x11, 0x22, 0x33)));
    assert_eq!(recorder.result_for("10.0.0.3").vendor.name, "Broad Corp");
    Ok(())
}

#[test]
fn disabled_vendors_leave_results_bare() {
    let network = office();
    let api = canned();
    let cache = VendorCache::in_memory();
    let mut recorder = Recorder::default();

    let resolver = VendorResolver::new(VendorMode::Disabled, &cache, Some(&api), API);
    let service = DiscoveryService::new(&network, &resolver, &config(32));
    assert!(service.scan("192.168.1.0/24", &mut recorder).is_success());

    assert_eq!(recorder.found().len(), 5);
    assert!(recorder.found().iter().all(|r| r.vendor.is_empty()));
    assert_eq!(api.calls(), 0);
    assert!(!api.asked_for("B8:27:EB"));
}

#[test]
fn several_expressions_share_one_resolver() {
    let network = office();
    let api = canned();
    let cache = VendorCache::in_memory();
    let resolver = VendorResolver::new(VendorMode::Online, &cache, Some(&api), API);
    let service = DiscoveryService::new(&network, &resolver, &config(1));

    let mut recorder = Recorder::default();
    let statuses: Vec<ScanStatus> = ["192.168.1.10", "192.168.1.11", "192.168.1.300", "192.168.1.9-5"]
        .iter()
        .map(|expr| service.scan(expr, &mut recorder))
        .collect();

    assert_eq!(
        statuses,
        vec![ScanStatus::Completed, ScanStatus::Completed, ScanStatus::InvalidInput, ScanStatus::EmptyRange]
    );
    assert_eq!(recorder.ranges.len(), 2);
    assert_eq!(recorder.results.len(), 2);

    // the second Pi comes out of the cache the first one filled
    assert_eq!(api.calls(), 1);
    assert_eq!(recorder.result_for("192.168.1.11").vendor.source, VendorSource::Cache);
}
