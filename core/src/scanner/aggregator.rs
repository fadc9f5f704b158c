//! Fan-in point for the probe workers.
//!
//! Workers share the aggregator behind an `Arc` and call [`Aggregator::record`]
//! concurrently. [`Aggregator::finalize`] takes it by value, so the report can
//! only be built once every worker has let go of its handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use sweepr_common::network::target::Target;
use sweepr_common::scan::{Liveness, ProbeResult, Protocol, ScanReport, ScanStats};
use tracing::warn;

pub struct Aggregator {
    target: Target,
    requested: usize,
    results: Mutex<HashMap<(u16, Protocol), ProbeResult>>,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl Aggregator {
    pub fn new(target: Target, requested: usize) -> Self {
        Self {
            target,
            requested,
            results: Mutex::new(HashMap::new()),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Stores `result` unless its (port, protocol) was already recorded.
    pub fn record(&self, result: ProbeResult) -> bool {
        let mut results = self.results.lock().unwrap_or_else(PoisonError::into_inner);
        if results.contains_key(&result.key()) {
            warn!(
                "Duplicate result for port {} ({}) ignored",
                result.port, result.protocol
            );
            return false;
        }
        results.insert(result.key(), result);
        true
    }

    /// Marks one port as fully probed, returning how many are done so far.
    pub fn port_done(&self) -> usize {
        self.completed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn probe_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finalize(self, liveness: Liveness, elapsed: Duration) -> ScanReport {
        let results = self
            .results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let mut open: Vec<ProbeResult> = results
            .into_values()
            .filter(|result| result.state.is_open())
            .collect();
        open.sort_by_key(|result| (result.protocol, result.port));

        let stats = ScanStats {
            requested: self.requested,
            completed: self.completed.into_inner(),
            failed: self.failed.into_inner(),
        };

        ScanReport {
            target: self.target,
            liveness,
            open,
            interrupted: stats.completed < stats.requested,
            stats,
            elapsed,
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
