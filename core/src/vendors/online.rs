//! Vendor lookup through the macvendorlookup.com web API.
//!
//! `GET <api>/<MAC>/json` answers with an array of matches; the first one's `company`
//! and `type` fields are used.

use arpscout_common::network::mac::{AddrBlock, HardwareAddr};
use arpscout_common::vendors::{Rgb, Vendor, VendorSource};
use serde::Deserialize;
use thiserror::Error;

use crate::network::http::{HttpRequest, QueueError, RequestQueue};

const COLOUR_HINTS: [(&str, Rgb); 2] = [
    ("raspberry pi", Rgb(0xc5, 0x1a, 0x4a)),
    ("hach lange", Rgb(0x00, 0x98, 0xdb)),
];

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("HTTP {0}")]
    Http(u16),

    #[error("unexpected response: {0}")]
    Parse(String),
}

#[derive(Debug, Deserialize)]
struct ApiEntry {
    company: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn request_for(mac: HardwareAddr, api_url: &str) -> HttpRequest {
    HttpRequest::get(format!("{}/{mac}/json", api_url.trim_end_matches('/')))
}

/// Queues the request and blocks until the answer is in.
pub fn lookup(queue: &dyn RequestQueue, api_url: &str, mac: HardwareAddr)
    -> Result<(AddrBlock, Vendor), LookupError> {
    let response = queue.enqueue(request_for(mac, api_url))?.wait()?;
    if !response.is_success() {
        return Err(LookupError::Http(response.status));
    }
    parse_response(&response.body)
}

pub fn parse_response(body: &str) -> Result<(AddrBlock, Vendor), LookupError> {
    let entries: Vec<ApiEntry> =
        serde_json::from_str(body).map_err(|e| LookupError::Parse(e.to_string()))?;
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::Parse("no entries".into()))?;

    let block = AddrBlock::from_label(&entry.kind)
        .ok_or_else(|| LookupError::Parse(format!("unknown address block {:?}", entry.kind)))?;
    if entry.company.trim().is_empty() {
        return Err(LookupError::Parse("empty company name".into()));
    }

    let colour = vendor_colour(&entry.company);
    Ok((block, Vendor::new(entry.company, colour, VendorSource::Api)))
}

/// Brand colour for a few well known vendors.
pub fn vendor_colour(name: &str) -> Option<Rgb> {
    let lower = name.to_lowercase();
    COLOUR_HINTS
        .iter()
        .find(|(hint, _)| lower.contains(hint))
        .map(|(_, colour)| *colour)
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
    use crate::network::http::{HttpResponse, Ticket};

    struct Canned(Result<HttpResponse, QueueError>);

    impl RequestQueue for Canned {
        fn enqueue(&self, _request: HttpRequest) -> Result<Ticket, QueueError> {
            Ok(Ticket::ready(self.0.clone()))
        }
    }

    #[test]
    fn request_url_contains_colon_delimited_mac() {
        let mac: HardwareAddr = "b8-27-eb-12-34-56".parse().unwrap();
        let req = request_for(mac, "https://www.macvendorlookup.com/api/v2/");
        assert_eq!(req.url, "https://www.macvendorlookup.com/api/v2/B8:27:EB:12:34:56/json");
    }

    #[test]
    fn parses_first_entry_and_block() {
        let body = r#"[{"startHex":"B827EB000000","endHex":"B827EBFFFFFF","company":"Raspberry Pi Foundation","type":"MA-L"},
                       {"company":"Someone Else","type":"oui28"}]"#;
        let (block, vendor) = parse_response(body).unwrap();
        assert_eq!(block, AddrBlock::Oui);
        assert_eq!(vendor.name, "Raspberry Pi Foundation");
        assert_eq!(vendor.colour, Some(Rgb(0xc5, 0x1a, 0x4a)));
        assert_eq!(vendor.source, VendorSource::Api);

        let (block, _) = parse_response(r#"[{"company":"X","type":"oui36"}]"#).unwrap();
        assert_eq!(block, AddrBlock::Oui36);
    }

    #[test]
    fn rejects_unusable_bodies() {
        for body in ["", "{}", "[]", r#"[{"company":"X","type":"weird"}]"#, r#"[{"company":"","type":"oui"}]"#] {
            assert!(matches!(parse_response(body), Err(LookupError::Parse(_))), "{body:?}");
        }
    }

    #[test]
    fn colour_hints_are_case_insensitive() {
        assert_eq!(vendor_colour("HACH LANGE SARL"), Some(Rgb(0x00, 0x98, 0xdb)));
        assert_eq!(vendor_colour("Raspberry Pi Trading Ltd"), Some(Rgb(0xc5, 0x1a, 0x4a)));
        assert_eq!(vendor_colour("Espressif Inc."), None);
    }

    #[test]
    fn lookup_maps_http_and_queue_failures() {
        let mac = HardwareAddr::new([0x00, 0x13, 0x6a, 1, 2, 3]);

        let not_found = Canned(Ok(HttpResponse { status: 404, body: String::new() }));
        assert!(matches!(lookup(&not_found, "http://api", mac), Err(LookupError::Http(404))));

        let closed = Canned(Err(QueueError::Closed));
        assert!(matches!(lookup(&closed, "http://api", mac), Err(LookupError::Queue(QueueError::Closed))));

        let ok = Canned(Ok(HttpResponse {
            status: 200,
            body: r#"[{"company":"Hach Lange Sarl","type":"oui"}]"#.into(),
        }));
        let (_, vendor) = lookup(&ok, "http://api", mac).unwrap();
        assert_eq!(vendor.name, "Hach Lange Sarl");
    }
}
