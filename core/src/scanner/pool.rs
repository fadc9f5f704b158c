//! Bounded fan-out of TCP and UDP probes over a port list.
//!
//! A fixed number of workers pull ports from a shared cursor, so a full
//! 65535-port sweep never holds more than `workers` tasks. Each port is owned
//! by exactly one worker, which probes TCP first and then UDP.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use sweepr_common::ports::PortSpec;
use sweepr_common::scan::{PortState, ProbeResult, Protocol};
use sweepr_common::success;
use sweepr_protocols::reply::{classify_tcp, classify_udp};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::aggregator::Aggregator;
use super::probe::{Probe, ProbeTransport};

const PROBE_ORDER: [Protocol; 2] = [Protocol::Tcp, Protocol::Udp];

/// Called with the number of fully probed ports each time one finishes.
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

pub struct ProbePool {
    transport: Arc<dyn ProbeTransport>,
    workers: usize,
    timeout: Duration,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

#[derive(Clone)]
struct Worker {
    transport: Arc<dyn ProbeTransport>,
    aggregator: Arc<Aggregator>,
    ports: Arc<[u16]>,
    cursor: Arc<AtomicUsize>,
    timeout: Duration,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
}

impl ProbePool {
    pub fn new(
        transport: Arc<dyn ProbeTransport>,
        workers: usize,
        timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            workers: workers.max(1),
            timeout,
            cancel,
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressCallback>) -> Self {
        self.on_progress = on_progress;
        self
    }

    /// Probes every port in `ports`, or stops early once cancelled.
    ///
    /// Returns after every worker has exited; worker panics are logged and
    /// leave the rest of the sweep untouched.
    pub async fn run(&self, ports: &PortSpec, aggregator: Arc<Aggregator>) {
        let worker = Worker {
            transport: Arc::clone(&self.transport),
            aggregator,
            ports: Arc::from(ports.as_slice()),
            cursor: Arc::new(AtomicUsize::new(0)),
            timeout: self.timeout,
            cancel: self.cancel.clone(),
            on_progress: self.on_progress.clone(),
        };

        let mut set = JoinSet::new();
        for _ in 0..self.workers.min(ports.len()) {
            set.spawn(worker.clone().run());
        }
        drop(worker);

        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                error!("Probe worker stopped abnormally: {e}");
            }
        }
    }
}

impl Worker {
    async fn run(self) {
        while let Some(port) = self.next_port() {
            for protocol in PROBE_ORDER {
                if self.cancel.is_cancelled() {
                    return;
                }
                self.probe(port, protocol).await;
            }

            let done = self.aggregator.port_done();
            if let Some(cb) = &self.on_progress {
                cb(done);
            }
        }
    }

    fn next_port(&self) -> Option<u16> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.ports.get(idx).copied()
    }

    async fn probe(&self, port: u16, protocol: Protocol) {
        let probe = Probe::for_port(protocol, port);

        let reply = match self.transport.exchange(probe, self.timeout).await {
            Ok(reply) => reply,
            Err(e) => {
                debug!("[{protocol}] port {port}: probe failed: {e:#}");
                self.aggregator.probe_failed();
                return;
            }
        };

        let state = match protocol {
            Protocol::Tcp => classify_tcp(reply.as_ref()),
            Protocol::Udp => classify_udp(reply.as_ref()),
        };

        match state {
            PortState::Open => {
                success!("[{protocol}] port {port} is open");
                self.aggregator
                    .record(ProbeResult::new(port, protocol, state));
            }
            PortState::Closed | PortState::Filtered | PortState::NoResponse => {
                debug!("[{protocol}] port {port} is {state}");
            }
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
