//! # Scan Engine
//!
//! Fans a target list out over a bounded number of worker threads and hands results to
//! the caller in the order they complete.
//!
//! Every taken job produces exactly one result. A worker that panics or cannot even be
//! spawned still returns its slot through [`JobSlot`], otherwise the engine would wait
//! for it forever.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use arpscout_common::network::addr::Addr4;
use arpscout_common::network::host::ScanResult;
use tracing::{debug, error, trace};

use crate::probe::HostDiscovery;
use crate::vendors::VendorLookup;

/// Upper bound for a single wait of the controller. Results wake it earlier.
const RESULT_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Nothing started yet.
    Idle,
    /// Jobs are still pending.
    Running,
    /// All jobs taken, waiting for workers or for results to be drained.
    Draining,
    Done,
}

struct QueueState {
    pending: VecDeque<Addr4>,
    in_flight: usize,
    completed: VecDeque<ScanResult>,
    started: bool,
}

/// Pending targets, in-flight count and completed results as one locked unit.
pub struct JobQueue {
    state: Mutex<QueueState>,
    result_ready: Condvar,
}

impl JobQueue {
    pub fn new(targets: impl IntoIterator<Item = Addr4>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: targets.into_iter().collect(),
                in_flight: 0,
                completed: VecDeque::new(),
                started: false,
            }),
            result_ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pops the next target unless `max_in_flight` jobs are already running.
    pub fn take_job(&self, max_in_flight: usize) -> Option<Addr4> {
        let mut state = self.lock();
        if state.in_flight >= max_in_flight {
            return None;
        }
        let target = state.pending.pop_front()?;
        state.in_flight += 1;
        state.started = true;
        Some(target)
    }

    fn push_result(&self, result: ScanResult) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        state.completed.push_back(result);
        self.result_ready.notify_all();
    }

    /// Pops the oldest completed result, waiting up to `timeout` for one to arrive.
    pub fn wait_result(&self, timeout: Duration) -> Option<ScanResult> {
        let state = self.lock();
        let (mut state, _) = self
            .result_ready
            .wait_timeout_while(state, timeout, |s| s.completed.is_empty() && !s.is_done())
            .unwrap_or_else(PoisonError::into_inner);
        state.completed.pop_front()
    }

    pub fn state(&self) -> EngineState {
        self.lock().engine_state()
    }

    pub fn is_done(&self) -> bool {
        self.lock().is_done()
    }
}

impl QueueState {
    fn is_done(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty() && self.in_flight == 0
    }

    fn engine_state(&self) -> EngineState {
        if self.is_done() {
            EngineState::Done
        } else if !self.started {
            EngineState::Idle
        } else if !self.pending.is_empty() {
            EngineState::Running
        } else {
            EngineState::Draining
        }
    }
}

/// A taken job. Dropping it without [`JobSlot::complete`] reports the target as not found.
pub struct JobSlot<'q> {
    queue: &'q JobQueue,
    target: Addr4,
    done: bool,
}

impl<'q> JobSlot<'q> {
    pub fn new(queue: &'q JobQueue, target: Addr4) -> Self {
        Self { queue, target, done: false }
    }

    pub fn target(&self) -> Addr4 {
        self.target
    }

    pub fn complete(mut self, result: ScanResult) {
        self.done = true;
        self.queue.push_result(result);
    }
}

impl Drop for JobSlot<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.queue.push_result(ScanResult::not_found(self.target));
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub scanned: usize,
    pub found: usize,
    pub elapsed: Duration,
}

pub struct ScanEngine<'a> {
    probe: &'a dyn HostDiscovery,
    vendors: &'a dyn VendorLookup,
    max_workers: usize,
}

impl<'a> ScanEngine<'a> {
    pub fn new(probe: &'a dyn HostDiscovery, vendors: &'a dyn VendorLookup, max_workers: usize) -> Self {
        Self { probe, vendors, max_workers: max_workers.max(1) }
    }

    /// Scans `targets` and calls `on_result` once per target, in completion order.
    ///
    /// Returns after every worker has been joined.
    pub fn run(&self, targets: Vec<Addr4>, mut on_result: impl FnMut(ScanResult)) -> ScanSummary {
        let started = Instant::now();
        let queue = JobQueue::new(targets);
        let mut summary = ScanSummary::default();
        let mut last_state = EngineState::Idle;

        thread::scope(|scope| {
            loop {
                while let Some(target) = queue.take_job(self.max_workers) {
                    let slot = JobSlot::new(&queue, target);
                    let spawned = thread::Builder::new()
                        .name(format!("probe-{target}"))
                        .spawn_scoped(scope, move || self.work(slot));
                    if let Err(e) = spawned {
                        // the closure and its slot were dropped, the target is reported as not found
                        error!(%target, error = %e, "failed to spawn worker");
                    }
                }

                let state = queue.state();
                if state != last_state {
                    debug!(?state, "scan engine");
                    last_state = state;
                }

                match queue.wait_result(RESULT_WAIT) {
                    Some(result) => {
                        summary.scanned += 1;
                        summary.found += usize::from(result.found);
                        on_result(result);
                    }
                    None if queue.is_done() => break,
                    None => {}
                }
            }
        });

        summary.elapsed = started.elapsed();
        debug!(scanned = summary.scanned, found = summary.found, "scan engine done");
        summary
    }

    fn work(&self, slot: JobSlot<'_>) {
        let target = slot.target();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.scan_one(target)));
        match outcome {
            Ok(result) => slot.complete(result),
            Err(_) => error!(%target, "worker panicked"),
        }
    }

    fn scan_one(&self, target: Addr4) -> ScanResult {
        let outcome = self.probe.probe(target);
        trace!(%target, found = outcome.found, "probe finished");
        if !outcome.found {
            return ScanResult {
                duration: outcome.duration,
                ..ScanResult::not_found(target)
            };
        }

        let vendor = self.vendors.resolve(outcome.mac);
        ScanResult::found(target, outcome.mac, outcome.duration).with_vendor(vendor)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;
    use arpscout_common::network::mac::HardwareAddr;
    use arpscout_common::vendors::{Vendor, VendorSource};
    use rand::Rng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers for even host ids, panics for every 7th, sleeps a random while.
    struct ChaosProbe {
        running: AtomicUsize,
        peak: AtomicUsize,
        max_latency_ms: u64,
    }

    impl ChaosProbe {
        fn new(max_latency_ms: u64) -> Self {
            Self { running: AtomicUsize::new(0), peak: AtomicUsize::new(0), max_latency_ms }
        }
    }

    impl HostDiscovery for ChaosProbe {
        fn probe(&self, target: Addr4) -> ProbeOutcome {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let latency = rand::rng().random_range(0..=self.max_latency_ms);
            thread::sleep(Duration::from_millis(latency));
            self.running.fetch_sub(1, Ordering::SeqCst);

            let id = target.octet_low();
            if id % 7 == 0 {
                panic!("simulated probe failure for {target}");
            }
            if id % 2 == 0 {
                ProbeOutcome::found(HardwareAddr::from_u64(u64::from(id)), Duration::from_millis(latency))
            } else {
                ProbeOutcome::not_found(Duration::from_millis(latency))
            }
        }
    }

    struct FixedVendor;

    impl VendorLookup for FixedVendor {
        fn resolve(&self, _mac: HardwareAddr) -> Vendor {
            Vendor::new("Acme", None, VendorSource::Cache)
        }
    }

    fn targets(n: u8) -> Vec<Addr4> {
        (1..=n).map(|i| Addr4::new(10, 0, 0, i)).collect()
    }

    #[test]
    fn every_target_yields_exactly_one_result() {
        for (n, workers) in [(1u8, 1usize), (17, 4), (60, 20), (100, 100)] {
            let probe = ChaosProbe::new(15);
            let engine = ScanEngine::new(&probe, &FixedVendor, workers);

            let mut seen = Vec::new();
            let summary = engine.run(targets(n), |r| seen.push(r));

            assert_eq!(seen.len(), usize::from(n));
            let distinct: HashSet<Addr4> = seen.iter().map(|r| r.ip).collect();
            assert_eq!(distinct, targets(n).into_iter().collect::<HashSet<_>>());
            assert_eq!(summary.scanned, usize::from(n));
            assert!(probe.peak.load(Ordering::SeqCst) <= workers);
        }
    }

    #[test]
    fn found_hosts_carry_mac_and_vendor() {
        let probe = ChaosProbe::new(2);
        let engine = ScanEngine::new(&probe, &FixedVendor, 8);

        let mut results = Vec::new();
        let summary = engine.run(targets(20), |r| results.push(r));

        for r in &results {
            let id = r.ip.octet_low();
            let expect_found = id % 2 == 0 && id % 7 != 0;
            assert_eq!(r.found, expect_found, "{}", r.ip);
            if expect_found {
                assert_eq!(r.mac.to_u64(), u64::from(id));
                assert_eq!(r.vendor.name, "Acme");
            } else {
                assert!(r.vendor.is_empty());
            }
        }
        assert_eq!(summary.found, results.iter().filter(|r| r.found).count());
    }

    #[test]
    fn empty_target_list_finishes_immediately() {
        let probe = ChaosProbe::new(0);
        let engine = ScanEngine::new(&probe, &FixedVendor, 4);
        let summary = engine.run(Vec::new(), |_| panic!("no results expected"));
        assert_eq!(summary.scanned, 0);
    }

    #[test]
    fn job_queue_tracks_state() {
        let queue = JobQueue::new(targets(2));
        assert_eq!(queue.state(), EngineState::Idle);

        let first = queue.take_job(1).unwrap();
        assert_eq!(queue.take_job(1), None, "in-flight limit reached");
        assert_eq!(queue.state(), EngineState::Running);

        JobSlot::new(&queue, first).complete(ScanResult::not_found(first));
        let second = queue.take_job(1).unwrap();
        assert_eq!(queue.state(), EngineState::Draining);

        // dropped without completing still returns a result
        drop(JobSlot::new(&queue, second));
        assert_eq!(queue.wait_result(Duration::ZERO).map(|r| r.ip), Some(first));
        assert_eq!(queue.wait_result(Duration::ZERO).map(|r| r.ip), Some(second));
        assert!(queue.is_done());
        assert_eq!(queue.state(), EngineState::Done);
    }
}
