//! Orchestration of a single-host sweep.
//!
//! [`perform_scan`] runs the liveness check, fans the port list out over a
//! [`pool::ProbePool`] and folds everything into a [`ScanReport`]. The network
//! is only reached through a [`probe::ProbeTransport`], so the same flow runs
//! against raw sockets or a simulated responder.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use sweepr_common::config::Config;
use sweepr_common::network::target::Target;
use sweepr_common::ports::PortSpec;
use sweepr_common::scan::{Liveness, ScanReport};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod aggregator;
pub mod liveness;
pub mod pool;
pub mod probe;

use aggregator::Aggregator;
use pool::{ProbePool, ProgressCallback};
use probe::ProbeTransport;

/// Executes a full sweep of `ports` on `target`.
///
/// Cancelling `cancel` stops workers from taking new ports; the report then
/// covers what finished and is marked interrupted.
pub async fn perform_scan(
    target: Target,
    ports: &PortSpec,
    cfg: &Config,
    transport: Arc<dyn ProbeTransport>,
    cancel: CancellationToken,
    on_progress: Option<ProgressCallback>,
) -> anyhow::Result<ScanReport> {
    let started = Instant::now();

    let liveness = if cfg.skip_ping {
        Liveness::Skipped
    } else {
        liveness::probe(transport.as_ref(), target, cfg.ping_timeout).await
    };
    if liveness == Liveness::Unreachable {
        warn!("{target} did not answer the echo request, scanning anyway");
    }

    let aggregator = Arc::new(Aggregator::new(target, ports.len()));
    if !ports.is_empty() {
        info!(
            "Probing {} ports on {target} with {} workers",
            ports.len(),
            cfg.workers()
        );
        ProbePool::new(transport, cfg.workers(), cfg.probe_timeout, cancel)
            .with_progress(on_progress)
            .run(ports, Arc::clone(&aggregator))
            .await;
    }

    let aggregator = Arc::into_inner(aggregator)
        .context("a probe worker still holds the result aggregator")?;

    Ok(aggregator.finalize(liveness, started.elapsed()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
