use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use arpscout_common::network::addr::Addr4;
use arpscout_common::network::host::ScanResult;
use arpscout_common::network::mac::HardwareAddr;
use arpscout_common::network::range::ResolvedRange;
use arpscout_core::discovery::ScanObserver;
use arpscout_core::network::http::{HttpRequest, HttpResponse, QueueError, RequestQueue, Ticket};
use arpscout_core::probe::{HostDiscovery, ProbeOutcome};
use arpscout_core::scanner::ScanSummary;
use rand::Rng;

/// Answers for a fixed set of hosts after a short random delay.
pub struct ScriptedNetwork {
    hosts: HashMap<Addr4, HardwareAddr>,
}

impl ScriptedNetwork {
    pub fn new(hosts: &[(&str, &str)]) -> Self {
        let hosts = hosts
            .iter()
            .map(|(ip, mac)| (ip.parse().unwrap(), mac.parse().unwrap()))
            .collect();
        Self { hosts }
    }
}

impl HostDiscovery for ScriptedNetwork {
    fn probe(&self, target: Addr4) -> ProbeOutcome {
        let latency = Duration::from_micros(rand::rng().random_range(50..800));
        thread::sleep(latency);
        match self.hosts.get(&target) {
            Some(&mac) => ProbeOutcome::found(mac, latency),
            None => ProbeOutcome::not_found(latency),
        }
    }
}

/// Lookup API that knows a handful of prefixes and answers 404 for the rest.
pub struct CannedApi {
    answers: Vec<(&'static str, &'static str)>,
    urls: Mutex<Vec<String>>,
}

impl CannedApi {
    /// `answers` maps a MAC prefix as printed (`B8:27:EB`) to a JSON body.
    pub fn new(answers: Vec<(&'static str, &'static str)>) -> Self {
        Self { answers, urls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().unwrap().len()
    }

    pub fn asked_for(&self, prefix: &str) -> bool {
        self.urls.lock().unwrap().iter().any(|url| url.contains(prefix))
    }
}

impl RequestQueue for CannedApi {
    fn enqueue(&self, request: HttpRequest) -> Result<Ticket, QueueError> {
        let answer = self
            .answers
            .iter()
            .find(|(prefix, _)| request.url.contains(prefix))
            .map(|(_, body)| HttpResponse { status: 200, body: body.to_string() })
            .unwrap_or(HttpResponse { status: 404, body: String::new() });
        self.urls.lock().unwrap().push(request.url);
        Ok(Ticket::ready(Ok(answer)))
    }
}

/// Keeps everything a scan reports.
#[derive(Default)]
pub struct Recorder {
    pub ranges: Vec<ResolvedRange>,
    pub results: Vec<ScanResult>,
    pub summaries: Vec<ScanSummary>,
}

impl Recorder {
    pub fn found(&self) -> Vec<&ScanResult> {
        let mut found: Vec<&ScanResult> = self.results.iter().filter(|r| r.found).collect();
        found.sort_by_key(|r| r.ip);
        found
    }

    pub fn result_for(&self, ip: &str) -> &ScanResult {
        let ip: Addr4 = ip.parse().unwrap();
        self.results.iter().find(|r| r.ip == ip).unwrap()
    }
}

impl ScanObserver for Recorder {
    fn range_resolved(&mut self, range: &ResolvedRange) {
        self.ranges.push(range.clone());
    }

    fn host(&mut self, result: &ScanResult) {
        self.results.push(result.clone());
    }

    fn finished(&mut self, summary: &ScanSummary) {
        self.summaries.push(*summary);
    }
}
