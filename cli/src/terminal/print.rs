use std::fmt::Write as _;

use arpscout_common::network::addr::cidr_string;
use arpscout_common::network::host::ScanResult;
use arpscout_common::network::range::ResolvedRange;
use arpscout_common::vendors::VendorSource;
use arpscout_core::scanner::ScanSummary;
use colored::*;
use tracing::info;

use crate::terminal::colors;

pub const TOTAL_WIDTH: usize = 64;

pub fn print(msg: &str) {
    info!(target: "arpscout::print", raw_msg = msg);
}

pub fn header(msg: &str) {
    let formatted: String = format!("⟦ {} ⟧", msg);
    let msg_len: usize = formatted.chars().count();

    let dash_count: usize = TOTAL_WIDTH.saturating_sub(msg_len);
    let left: usize = dash_count / 2;
    let right: usize = dash_count - left;

    let line: ColoredString = format!(
        "{}{}{}",
        "─".repeat(left),
        formatted.to_uppercase().color(colors::PRIMARY),
        "─".repeat(right)
    )
    .color(colors::SEPARATOR);

    print(&line.to_string());
}

/// `scanning N IPs from <first> to <last>`, or `scanning IP <addr>` for a single target.
pub fn range_statistics_line(range: &ResolvedRange) -> Option<String> {
    match (range.first(), range.last()) {
        (Some(first), Some(last)) if range.len() > 1 => Some(format!(
            "scanning {} IPs from {} to {}",
            range.len(),
            cidr_string(first, range.mask).color(colors::HIGHLIGHT),
            cidr_string(last, range.mask).color(colors::HIGHLIGHT),
        )),
        (Some(only), _) => Some(format!("scanning IP {}", only.to_string().color(colors::HIGHLIGHT))),
        _ => None,
    }
}

pub fn range_statistics(range: &ResolvedRange) {
    if let Some(line) = range_statistics_line(range) {
        print(&line);
    }
}

/// One result row: address, MAC (yellow for CIDs), latency and the vendor if known.
pub fn result_line(result: &ScanResult, show_source: bool) -> String {
    let mac = format!("{:<17}", result.mac.to_string());
    let mac = if result.mac.is_cid() { mac.color(colors::CID) } else { mac.normal() };

    let mut line = format!(" {:<15}  {}  {:>4}ms", result.ip.to_string(), mac, result.millis());

    let vendor = &result.vendor;
    if !vendor.is_empty() {
        line.push_str("  ");
        if show_source && vendor.source != VendorSource::None {
            let _ = write!(line, "{}", format!("[{}]", vendor.source).color(colors::SEPARATOR));
        }
        let name = match vendor.colour {
            Some(c) => vendor.name.as_str().truecolor(c.0, c.1, c.2),
            None => vendor.name.as_str().normal(),
        };
        let _ = write!(line, " {name}");
    }
    line
}

pub fn host(result: &ScanResult, show_source: bool) {
    print(&result_line(result, show_source));
}

pub fn summary(summary: &ScanSummary) {
    let found: ColoredString = format!("{} hosts", summary.found).bold().green();
    let elapsed: ColoredString = format!("{:.2}s", summary.elapsed.as_secs_f64()).bold().yellow();
    print(&format!(
        "{} {} of {} answered in {}",
        "done:".color(colors::SEPARATOR),
        found,
        summary.scanned,
        elapsed
    ));
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
    use arpscout_common::network::range;
    use arpscout_common::vendors::{Rgb, Vendor};
    use std::time::Duration;

    fn plain() {
        colored::control::set_override(false);
    }

    fn result(mac: [u8; 6], vendor: Vendor) -> ScanResult {
        ScanResult::found(Addr4::new(192, 168, 1, 7), HardwareAddr::new(mac), Duration::from_millis(12))
            .with_vendor(vendor)
    }

    #[test]
    fn result_line_columns() {
        plain();
        let line = result_line(&result([0xb8, 0x27, 0xeb, 1, 2, 3], Vendor::default()), true);
        assert_eq!(line, " 192.168.1.7      B8:27:EB:01:02:03    12ms");
    }

    #[test]
    fn result_line_with_vendor_and_source() {
        plain();
        let pi = Vendor::new("Raspberry Pi Foundation", Some(Rgb(0xc5, 0x1a, 0x4a)), VendorSource::Cache);
        let r = result([0xb8, 0x27, 0xeb, 1, 2, 3], pi);

        assert!(result_line(&r, true).ends_with("12ms  [c] Raspberry Pi Foundation"));
        assert!(result_line(&r, false).ends_with("12ms   Raspberry Pi Foundation"));
    }

    #[test]
    fn range_statistics_for_many_and_one() {
        plain();
        let range = range::resolve(&"192.168.1.0".parse().unwrap()).unwrap();
        assert_eq!(
            range_statistics_line(&range).unwrap(),
            "scanning 254 IPs from 192.168.1.1/24 to 192.168.1.254/24"
        );

        let single = range::resolve(&"10.0.0.7".parse().unwrap()).unwrap();
        assert_eq!(range_statistics_line(&single).unwrap(), "scanning IP 10.0.0.7");
    }
}
