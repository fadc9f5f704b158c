use std::time::Duration;

use sweepr_common::network::target::Target;
use sweepr_common::scan::Liveness;
use tracing::{debug, warn};

use super::probe::{Probe, ProbeTransport};

/// Sends one echo request and reports whether anything came back in time.
///
/// Any ICMP answer counts, errors included. Transport failures are logged
/// and reported as [`Liveness::Unreachable`]; the scan goes on either way.
pub async fn probe(transport: &dyn ProbeTransport, target: Target, timeout: Duration) -> Liveness {
    match transport.exchange(Probe::Echo, timeout).await {
        Ok(Some(reply)) => {
            debug!("{target} answered echo with {reply:?}");
            Liveness::Alive
        }
        Ok(None) => Liveness::Unreachable,
        Err(e) => {
            warn!("Echo probe to {target} failed: {e:#}");
            Liveness::Unreachable
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
